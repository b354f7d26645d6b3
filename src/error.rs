//! Error types for psdport library.

use std::io;
use thiserror::Error;

/// Result type alias for psdport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while importing or exporting layered documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input does not start with the document magic signature.
    #[error("Malformed input: not a layered PSD document")]
    MalformedInput,

    /// The document header carries a version this library does not know.
    #[error("Unsupported document version: {0}")]
    UnsupportedVersion(u16),

    /// The external codec failed to decode or encode a document.
    #[error("Codec error: {0}")]
    Codec(String),

    /// The external codec cannot be invoked at all.
    #[error("Codec unavailable: {0}")]
    CodecUnavailable(String),

    /// Error while drawing into or reading from a raster surface.
    #[error("Raster error: {0}")]
    Raster(String),

    /// Error decoding or encoding bitmap data.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Error loading or parsing font data.
    #[error("Font error: {0}")]
    Font(String),

    /// A text style run carries values that cannot be converted.
    #[error("Malformed style run: {0}")]
    MalformedStyle(String),

    /// Error writing a multi-page archive.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error serializing the editable model.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No page with the given id exists in the project.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MalformedInput;
        assert_eq!(
            err.to_string(),
            "Malformed input: not a layered PSD document"
        );

        let err = Error::PageNotFound("page-2".to_string());
        assert_eq!(err.to_string(), "Page not found: page-2");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
