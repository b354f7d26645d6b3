//! Layered document format detection and validation.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Layered document format information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PsdFormat {
    /// Header version (1 = PSD, 2 = PSB)
    pub version: u16,
    /// Whether the file uses the large document (PSB) layout
    pub large_document: bool,
}

impl std::fmt::Display for PsdFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.large_document {
            write!(f, "PSB v{}", self.version)
        } else {
            write!(f, "PSD v{}", self.version)
        }
    }
}

/// Magic signature: 8BPS
pub const PSD_MAGIC: &[u8; 4] = b"8BPS";
const HEADER_LEN: usize = 6; // signature + big-endian u16 version

/// Detect the document format from a file path.
///
/// # Arguments
/// * `path` - Path to the document
///
/// # Returns
/// * `Ok(PsdFormat)` if the file starts with a valid header
/// * `Err(Error::MalformedInput)` if the signature is missing
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PsdFormat> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut header = Vec::with_capacity(HEADER_LEN);
    reader.take(HEADER_LEN as u64).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the document format from bytes.
///
/// Only the first four bytes decide whether the data is a layered document at
/// all; the version field is checked afterwards.
///
/// # Arguments
/// * `data` - Byte slice containing at least the first 6 bytes of the file
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PsdFormat> {
    if data.len() < PSD_MAGIC.len() || !data.starts_with(PSD_MAGIC) {
        return Err(Error::MalformedInput);
    }

    if data.len() < HEADER_LEN {
        return Err(Error::MalformedInput);
    }

    let version = u16::from_be_bytes([data[4], data[5]]);
    match version {
        1 => Ok(PsdFormat {
            version,
            large_document: false,
        }),
        2 => Ok(PsdFormat {
            version,
            large_document: true,
        }),
        other => Err(Error::UnsupportedVersion(other)),
    }
}

/// Check if a file is a layered document.
pub fn is_psd<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes start with a valid layered document header.
pub fn is_psd_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
