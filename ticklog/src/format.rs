//! On-disk layout of a ticklog file.
//!
//! # File Format
//!
//! ```text
//! [0..32)   Header (FileHeader)
//! [32..)    Records, RECORD_SIZE bytes each, in arrival order
//! ```
//!
//! The header layout:
//!
//! ```text
//! [0..4)    magic       b"TKLG"
//! [4..8)    version     u32 LE
//! [8..16)   when_scale  u64 LE
//! [16..24)  data_scale  u64 LE
//! [24..32)  reserved    zero
//! ```
//!
//! Records are fixed-size and only ever appended, so a crash in the middle of
//! a write can at worst leave a partial record at the tail; everything before
//! it stays intact.

use crate::error::{FormatError, Result};
use crate::scale::ScaleFactors;

/// Magic bytes identifying a ticklog file.
pub const MAGIC: [u8; 4] = *b"TKLG";

/// Current format version.
pub const VERSION: u32 = 1;

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 32;

/// Header written at the start of every log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Format version.
    pub version: u32,
    /// Scale factors the file was written with.
    pub scale: ScaleFactors,
}

impl FileHeader {
    /// Creates a header for the current format version.
    pub fn new(scale: ScaleFactors) -> Self {
        Self {
            version: VERSION,
            scale,
        }
    }

    /// Encodes the header into its fixed layout.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&self.version.to_le_bytes());
        out[8..16].copy_from_slice(&self.scale.when_scale.to_le_bytes());
        out[16..24].copy_from_slice(&self.scale.data_scale.to_le_bytes());
        out
    }

    /// Decodes and validates a header from the start of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if `bytes` is too short, the magic or version
    /// does not match, or a scale factor is zero.
    pub fn decode(bytes: &[u8], path: &str) -> Result<Self> {
        let Some(header) = bytes.get(..HEADER_SIZE) else {
            return Err(FormatError::MissingHeader {
                path: path.to_string(),
                len: bytes.len() as u64,
                needed: HEADER_SIZE as u64,
            }
            .into());
        };

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[0..4]);
        if magic != MAGIC {
            return Err(FormatError::BadMagic {
                path: path.to_string(),
                found: magic,
            }
            .into());
        }

        let version = read_u32(&header[4..8]);
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion {
                path: path.to_string(),
                found: version,
                expected: VERSION,
            }
            .into());
        }

        let scale = ScaleFactors {
            when_scale: read_u64(&header[8..16]),
            data_scale: read_u64(&header[16..24]),
        };
        if scale.validate().is_err() {
            return Err(FormatError::ZeroScale {
                path: path.to_string(),
            }
            .into());
        }

        Ok(Self { version, scale })
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
