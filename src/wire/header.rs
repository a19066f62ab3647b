//! Document preamble parsing.

use thiserror::Error;
use zerocopy::FromBytes;

/// An error in the document preamble.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// Incorrect filetype marker.
    #[error("Incorrect file type marker.")]
    NotFitData,
    /// Unknown header length.
    #[error("Unknown header length ({0}).")]
    UnknownHeaderLength(u8),
}

/// The decoded document preamble.
///
/// A twelve-byte preamble ends here; a fourteen-byte one is followed by a
/// two-byte checksum of the first twelve, which [`extended`](Self::extended)
/// signals and the decode pass consumes. No other length is valid.
#[derive(Debug, Clone, Copy)]
pub struct DocumentHeader {
    pub protocol_version: u8,
    pub profile_version: u16,
    /// Number of record bytes following the preamble.
    pub data_size: u32,
    /// A two-byte header checksum follows these twelve bytes.
    pub extended: bool,
}

impl DocumentHeader {
    /// Parse the first twelve bytes of a document.
    pub fn parse(r: [u8; 12]) -> Result<Self, HeaderError> {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct RawHeader {
            header_size: u8,
            protocol_version: u8,
            profile_version: [u8; 2],
            data_size: [u8; 4],
            data_type: [u8; 4],
        }

        let RawHeader {
            header_size,
            protocol_version,
            profile_version,
            data_size,
            data_type,
        } = zerocopy::transmute!(r);

        if &data_type != b".FIT" {
            Err(HeaderError::NotFitData)?;
        }

        let extended = match header_size {
            14 => true,
            12 => false,
            _ => Err(HeaderError::UnknownHeaderLength(header_size))?,
        };

        Ok(Self {
            protocol_version,
            profile_version: u16::from_le_bytes(profile_version),
            data_size: u32::from_le_bytes(data_size),
            extended,
        })
    }
}
