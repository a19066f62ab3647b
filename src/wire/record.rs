//! Record header parsing.

use either::Either::{self, Left, Right};
use tartan_bitfield::bitfield;
use thiserror::Error;

/// An error in a record header.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Compressed-timestamp record headers repurpose the slot bits as a time
    /// delta and cannot be decoded by this machinery.
    #[error("Unsupported compressed-timestamp record header.")]
    CompressedTimestamp,
}

/// Announcement of a definition record.
#[derive(Debug)]
pub struct DefinitionHeader {
    /// Developer-field declarations trail the standard ones.
    pub developer: bool,
}

/// Announcement of a data record.
#[derive(Debug)]
pub struct DataHeader;

/// Split a record-header byte into its local slot number and record kind.
pub fn parse(r: u8) -> Result<(u8, Either<DefinitionHeader, DataHeader>), RecordError> {
    bitfield! {
        struct RecordHeader(u8) {
            [0..4] local_message: u8,
            [5] is_developer,
            [6] is_definition,
            [7] is_compressed,
        }
    }

    let header = RecordHeader(r);

    if header.is_compressed() {
        Err(RecordError::CompressedTimestamp)?;
    }

    let slot = header.local_message();

    let kind = if header.is_definition() {
        Left(DefinitionHeader {
            developer: header.is_developer(),
        })
    } else {
        Right(DataHeader)
    };

    Ok((slot, kind))
}
