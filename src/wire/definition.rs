//! Definition records and the per-slot layout registry.

use thiserror::Error;
use zerocopy::FromBytes;

use super::data::BaseType;

/// An error parsing a field descriptor.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Base-type code outside the format's type table. Without a known
    /// width the record stream cannot be kept aligned.
    #[error("Unrecognized base type code ({0:#04x}).")]
    UnknownBaseType(u8),
}

/// The fixed-layout prefix of a definition record.
#[derive(Debug, Clone, Copy)]
pub struct DefinitionPrefix {
    /// Byte order declared for the slot's multi-byte fields.
    pub little_endian: bool,
    /// Global message identifier.
    pub global: u16,
    /// Number of standard field descriptors that follow.
    pub field_count: u8,
}

impl DefinitionPrefix {
    /// Parse the five bytes following a definition record's header byte.
    pub fn parse(r: [u8; 5]) -> Self {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct RawPrefix {
            _reserved: u8,
            architecture: u8,
            global_message: [u8; 2],
            field_count: u8,
        }

        let RawPrefix {
            architecture,
            global_message,
            field_count,
            ..
        } = zerocopy::transmute!(r);

        let little_endian = architecture == 0;
        let global = if little_endian {
            u16::from_le_bytes(global_message)
        } else {
            u16::from_be_bytes(global_message)
        };

        Self {
            little_endian,
            global,
            field_count,
        }
    }
}

/// One declared field inside a message layout.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Format-assigned field definition number.
    pub number: u8,
    /// Declared size in bytes. A multiple of the base width beyond one
    /// element declares a fixed-length array.
    pub size: u8,
    pub base: BaseType,
    /// Declared among the trailing developer descriptors; consumed for
    /// alignment, never decoded.
    pub developer: bool,
}

impl FieldDefinition {
    /// Parse a standard three-byte field descriptor.
    pub fn parse(r: [u8; 3]) -> Result<Self, DefinitionError> {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct RawField {
            number: u8,
            size: u8,
            base_type: u8,
        }

        let RawField {
            number,
            size,
            base_type,
        } = zerocopy::transmute!(r);

        let base = BaseType::from_declared(base_type)
            .ok_or(DefinitionError::UnknownBaseType(base_type))?;

        Ok(Self {
            number,
            size,
            base,
            developer: false,
        })
    }

    /// Parse a three-byte developer field descriptor.
    ///
    /// The third byte indexes a developer data registry rather than the base
    /// type table, so no type lookup happens here; the field only ever keeps
    /// the record stream aligned.
    pub fn parse_developer(r: [u8; 3]) -> Self {
        let [number, size, _index] = r;

        Self {
            number,
            size,
            base: BaseType::Byte,
            developer: true,
        }
    }
}

/// A message layout: the most recent definition declared for a slot.
#[derive(Debug, Clone)]
pub struct MessageDefinition {
    /// Global message identifier.
    pub global: u16,
    /// Byte order for every multi-byte field in this layout.
    pub little_endian: bool,
    /// Declared fields, in wire order, developer fields last.
    pub fields: Vec<FieldDefinition>,
}

impl MessageDefinition {
    /// Size in bytes of one data record in this layout.
    pub fn wire_size(&self) -> usize {
        self.fields.iter().map(|f| usize::from(f.size)).sum()
    }
}

/// Per-slot layout state for one decode pass.
///
/// Installing a definition replaces the slot's previous layout outright, so
/// a data record always decodes against the newest definition for its slot.
#[derive(Debug, Default)]
pub struct Registry([Option<MessageDefinition>; 16]);

impl Registry {
    /// Install `definition` for `slot`, replacing any predecessor.
    pub fn install(&mut self, slot: u8, definition: MessageDefinition) {
        self.0[usize::from(slot & 0x0F)] = Some(definition);
    }

    /// The current layout for `slot`, if one has been installed.
    pub fn get(&self, slot: u8) -> Option<&MessageDefinition> {
        self.0[usize::from(slot & 0x0F)].as_ref()
    }
}
