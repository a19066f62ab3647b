//! Base types and data record decoding.

use std::collections::BTreeMap;

use super::definition::MessageDefinition;

/// A base type from the format's closed type table.
///
/// Every code is known up front; a declared code outside the table is a
/// protocol error, surfaced while parsing the definition record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Enum,
    SInt8,
    UInt8,
    SInt16,
    UInt16,
    SInt32,
    UInt32,
    String,
    Float32,
    Float64,
    UInt8z,
    UInt16z,
    UInt32z,
    Byte,
    SInt64,
    UInt64,
    UInt64z,
}

impl BaseType {
    /// Look up a declared base-type byte.
    ///
    /// The low five bits number the type; the high bit marks multi-byte
    /// types and carries no layout information of its own.
    pub fn from_declared(r: u8) -> Option<Self> {
        Some(match r & 0x1F {
            0 => Self::Enum,
            1 => Self::SInt8,
            2 => Self::UInt8,
            3 => Self::SInt16,
            4 => Self::UInt16,
            5 => Self::SInt32,
            6 => Self::UInt32,
            7 => Self::String,
            8 => Self::Float32,
            9 => Self::Float64,
            10 => Self::UInt8z,
            11 => Self::UInt16z,
            12 => Self::UInt32z,
            13 => Self::Byte,
            14 => Self::SInt64,
            15 => Self::UInt64,
            16 => Self::UInt64z,
            _ => return None,
        })
    }

    /// Width in bytes of one element of this type.
    pub fn width(self) -> usize {
        match self {
            Self::Enum | Self::SInt8 | Self::UInt8 | Self::String | Self::UInt8z | Self::Byte => 1,
            Self::SInt16 | Self::UInt16 | Self::UInt16z => 2,
            Self::SInt32 | Self::UInt32 | Self::UInt32z | Self::Float32 => 4,
            Self::Float64 | Self::SInt64 | Self::UInt64 | Self::UInt64z => 8,
        }
    }

    /// Decode a run of elements of this type.
    ///
    /// The slice length must be a multiple of the element width; the caller
    /// establishes this from the field's declared size.
    pub fn decode(self, r: &[u8], is_little_endian: bool) -> Value {
        macro_rules! elements {
            ($t:ty) => {
                r.chunks_exact(size_of::<$t>())
                    .map(|c| {
                        let c = c.try_into().unwrap();
                        if is_little_endian {
                            <$t>::from_le_bytes(c)
                        } else {
                            <$t>::from_be_bytes(c)
                        }
                    })
                    .collect()
            };
        }

        match self {
            Self::Enum | Self::UInt8 | Self::String | Self::UInt8z | Self::Byte => {
                Value::U8(r.to_vec())
            }
            Self::SInt8 => Value::I8(elements!(i8)),
            Self::SInt16 => Value::I16(elements!(i16)),
            Self::UInt16 | Self::UInt16z => Value::U16(elements!(u16)),
            Self::SInt32 => Value::I32(elements!(i32)),
            Self::UInt32 | Self::UInt32z => Value::U32(elements!(u32)),
            Self::Float32 => Value::F32(elements!(f32)),
            Self::Float64 => Value::F64(elements!(f64)),
            Self::SInt64 => Value::I64(elements!(i64)),
            Self::UInt64 | Self::UInt64z => Value::U64(elements!(u64)),
        }
    }
}

/// A decoded field value.
///
/// Always a sequence: a scalar field is a one-element sequence, and a field
/// declared as `k` times its base width holds `k` elements in stream order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Value {
    /// Number of decoded elements.
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first element, if this is a `u8` value.
    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Self::U8(v) => v.first().copied(),
            _ => None,
        }
    }

    /// The first element, if this is a `u32` value.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => v.first().copied(),
            _ => None,
        }
    }

    /// The first element, if this is an `i32` value.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => v.first().copied(),
            _ => None,
        }
    }
}

/// The decoded field set of one data record.
///
/// Transient: produced per record, handed to projection, then dropped.
#[derive(Debug)]
pub struct DecodedMessage {
    /// Global identifier of the message type this record carried.
    pub global: u16,
    fields: BTreeMap<u8, Value>,
}

impl DecodedMessage {
    /// Look up a decoded field by its definition number.
    pub fn field(&self, number: u8) -> Option<&Value> {
        self.fields.get(&number)
    }
}

/// Decode one data record against its slot's installed layout.
///
/// `r` must hold exactly the record's payload, [`MessageDefinition::wire_size`]
/// bytes. Developer fields are consumed for alignment and discarded. A field
/// whose declared size is not a positive multiple of its base width is
/// reported and dropped; the rest of the record decodes normally.
pub fn decode_record(r: &[u8], slot: u8, definition: &MessageDefinition) -> DecodedMessage {
    debug_assert_eq!(r.len(), definition.wire_size());

    let mut fields = BTreeMap::new();
    let mut offset = 0;

    for field in &definition.fields {
        let size = usize::from(field.size);
        let bytes = &r[offset..offset + size];
        offset += size;

        if field.developer {
            continue;
        }

        if size == 0 || size % field.base.width() != 0 {
            tracing::warn!(
                slot,
                number = field.number,
                size = field.size,
                base = ?field.base,
                "declared size is not a positive multiple of the base width, dropping field"
            );
            continue;
        }

        fields.insert(
            field.number,
            field.base.decode(bytes, definition.little_endian),
        );
    }

    DecodedMessage {
        global: definition.global,
        fields,
    }
}
