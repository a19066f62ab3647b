//! Decode passes over activity documents.
//!
//! A pass reads its document front to back, one record per iteration:
//! definition records install a layout for their slot, data records decode
//! against the slot's current layout and feed the track projection. All
//! decode state, from the layout registry to the running checksum, lives
//! inside the call, so concurrent passes over different documents share
//! nothing.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use either::Either::{Left, Right};
use flate2::read::GzDecoder;
use thiserror::Error;

use crate::track::{self, Activity};
use crate::wire::check::checksum;
use crate::wire::data::decode_record;
use crate::wire::definition::{
    DefinitionError, DefinitionPrefix, FieldDefinition, MessageDefinition, Registry,
};
use crate::wire::header::{DocumentHeader, HeaderError};
use crate::wire::record::{self, RecordError};

/// Errors aborting a decode pass.
///
/// Offsets are measured from the first byte of the document. Problems
/// confined to a single field are not here: those are reported as
/// diagnostics and the pass continues without the field.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Incorrect document preamble.
    #[error("Incorrect document header: {0}")]
    Header(#[from] HeaderError),
    /// Unsupported compressed-timestamp record header.
    #[error("Unsupported compressed-timestamp record header at offset {offset}.")]
    CompressedTimestamp { offset: usize },
    /// Unrecognized base-type code in a definition record.
    #[error("Unrecognized base type code ({code:#04x}) in the definition at offset {offset}.")]
    UnknownBaseType { offset: usize, code: u8 },
    /// Data record for a slot with no installed definition.
    #[error("Data record for undefined local slot {slot} at offset {offset}.")]
    UndefinedSlot { offset: usize, slot: u8 },
}

/// Decode one document, appending projected output to `out`.
///
/// Track points and the sport classification accumulate in `out` as records
/// decode, so whatever was projected before a fatal error stays with the
/// caller.
pub fn decode(r: &mut impl Read, out: &mut Activity) -> Result<(), Error> {
    let i = &mut 0; // Counter of bytes read, also the offset in errors.
    let c = &mut 0; // Running checksum over every byte read.

    let header = DocumentHeader::parse(take(r, i, c)?)?;

    if header.extended {
        let expected = *c;
        let found = u16::from_le_bytes(take(r, i, c)?);

        // A zeroed header checksum means the writer left it unset.
        if found != 0 && found != expected {
            tracing::warn!(found, expected, "document header checksum mismatch");
        }
    }

    let end = *i + header.data_size as usize;

    // Per-slot layouts, local to this pass.
    let mut definitions = Registry::default();

    while *i < end {
        let offset = *i;
        let [byte] = take(r, i, c)?;

        let (slot, kind) =
            record::parse(byte).map_err(|e| match e {
                RecordError::CompressedTimestamp => Error::CompressedTimestamp { offset },
            })?;

        match kind {
            Left(definition) => {
                let definition = decode_definition(r, i, c, offset, definition.developer)?;
                definitions.install(slot, definition);
            }
            Right(_) => {
                let Some(definition) = definitions.get(slot) else {
                    return Err(Error::UndefinedSlot { offset, slot });
                };

                let bytes = take_n(r, definition.wire_size(), i, c)?;
                let message = decode_record(&bytes, slot, definition);

                track::project(&message, out);
            }
        }
    }

    // A two-byte check over the whole document may trail the records.
    let mut trailer = [0; 2];
    match r.read_exact(&mut trailer) {
        Ok(()) => {
            let found = u16::from_le_bytes(trailer);
            let calculated = *c;

            if found != calculated {
                tracing::warn!(found, calculated, "document checksum mismatch");
            }
        }
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {}
        Err(e) => Err(e)?,
    }

    Ok(())
}

/// Decode a document held in memory, appending projected output to `out`.
pub fn decode_slice(mut r: &[u8], out: &mut Activity) -> Result<(), Error> {
    decode(&mut r, out)
}

/// Decode a document from a file.
///
/// Recordings compressed as a gzip member are recognized by a `.gz` suffix
/// and decompressed transparently.
pub fn decode_file(path: impl AsRef<Path>) -> Result<Activity, Error> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path)?);

    let mut activity = Activity::default();

    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("gz")) {
        let mut r = GzDecoder::new(file);
        decode(&mut r, &mut activity)?;
    } else {
        let mut r = file;
        decode(&mut r, &mut activity)?;
    }

    Ok(activity)
}

/// Read the remainder of a definition record and assemble the layout.
fn decode_definition(
    r: &mut impl Read,
    i: &mut usize,
    c: &mut u16,
    offset: usize,
    developer: bool,
) -> Result<MessageDefinition, Error> {
    let prefix = DefinitionPrefix::parse(take(r, i, c)?);

    let mut fields = Vec::with_capacity(usize::from(prefix.field_count));

    for _ in 0..prefix.field_count {
        let field = FieldDefinition::parse(take(r, i, c)?).map_err(|e| match e {
            DefinitionError::UnknownBaseType(code) => Error::UnknownBaseType { offset, code },
        })?;

        fields.push(field);
    }

    if developer {
        let [count] = take(r, i, c)?;

        for _ in 0..count {
            fields.push(FieldDefinition::parse_developer(take(r, i, c)?));
        }
    }

    Ok(MessageDefinition {
        global: prefix.global,
        little_endian: prefix.little_endian,
        fields,
    })
}

/// Take an exact number of bytes from the reader, advancing the byte counter
/// and accumulating the running checksum.
fn take<const N: usize>(r: &mut impl Read, i: &mut usize, c: &mut u16) -> Result<[u8; N], Error> {
    let mut buf = [0; N];
    r.read_exact(&mut buf)?;

    *i += N;
    *c = checksum(*c, &buf);

    Ok(buf)
}

/// As [`take`], for sizes only known at run time.
fn take_n(r: &mut impl Read, n: usize, i: &mut usize, c: &mut u16) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0; n];
    r.read_exact(&mut buf)?;

    *i += n;
    *c = checksum(*c, &buf);

    Ok(buf)
}
