//! Document codec abstraction layer.
//!
//! The binary container is read and written by an implementation of
//! [`DocumentCodec`]; the conversion pipeline only ever sees a
//! [`DocumentTree`].

use std::sync::Arc;

use crate::detect::detect_format_from_bytes;
use crate::error::Result;
use crate::model::DocumentTree;

/// Abstract interface for reading and writing layered documents.
pub trait DocumentCodec: Send + Sync {
    /// Decode document bytes into a layer tree.
    fn decode(&self, data: &[u8]) -> Result<DocumentTree>;

    /// Encode a layer tree into document bytes.
    fn encode(&self, document: &DocumentTree) -> Result<Vec<u8>>;

    /// Check that the codec can be used (e.g. a runtime dependency is loaded).
    ///
    /// Returns `Error::CodecUnavailable` otherwise.
    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }

    /// File extension of encoded documents, without the dot.
    fn file_extension(&self) -> &str {
        "psd"
    }
}

impl<T: DocumentCodec + ?Sized> DocumentCodec for Arc<T> {
    fn decode(&self, data: &[u8]) -> Result<DocumentTree> {
        (**self).decode(data)
    }

    fn encode(&self, document: &DocumentTree) -> Result<Vec<u8>> {
        (**self).encode(document)
    }

    fn ensure_available(&self) -> Result<()> {
        (**self).ensure_available()
    }

    fn file_extension(&self) -> &str {
        (**self).file_extension()
    }
}

/// Verify the magic header, then decode.
pub fn decode_checked<C: DocumentCodec + ?Sized>(codec: &C, data: &[u8]) -> Result<DocumentTree> {
    let format = detect_format_from_bytes(data)?;
    log::debug!("Decoding {} ({} bytes)", format, data.len());

    codec.ensure_available()?;
    codec.decode(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::LayerNode;
    use crate::model::Bounds;

    struct FixedCodec;

    impl DocumentCodec for FixedCodec {
        fn decode(&self, _data: &[u8]) -> Result<DocumentTree> {
            let mut doc = DocumentTree::new(10, 10);
            doc.add_layer(LayerNode::new("only", Bounds::new(0, 0, 10, 10)));
            Ok(doc)
        }

        fn encode(&self, _document: &DocumentTree) -> Result<Vec<u8>> {
            Ok(b"8BPS\x00\x01".to_vec())
        }
    }

    #[test]
    fn test_decode_checked_rejects_bad_magic() {
        let result = decode_checked(&FixedCodec, b"GIF89a....");
        assert!(matches!(result, Err(Error::MalformedInput)));
    }

    #[test]
    fn test_decode_checked_accepts_psd() {
        let doc = decode_checked(&FixedCodec, b"8BPS\x00\x01rest").unwrap();
        assert_eq!(doc.layer_count(), 1);
    }

    #[test]
    fn test_arc_codec_defaults() {
        let codec: Arc<dyn DocumentCodec> = Arc::new(FixedCodec);
        assert_eq!(codec.file_extension(), "psd");
        assert!(codec.ensure_available().is_ok());
    }
}
