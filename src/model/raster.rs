//! Pixel payloads: raw layer pixels and encoded bitmaps.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Pixel content attached to a layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RasterSource {
    /// Straight-alpha RGBA8 pixels, row-major
    Pixels {
        width: u32,
        height: u32,
        #[serde(with = "base64_bytes")]
        rgba: Vec<u8>,
    },

    /// An encoded image (PNG, JPEG, BMP)
    Encoded {
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
}

impl RasterSource {
    /// Create a pixel source.
    pub fn pixels(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        RasterSource::Pixels {
            width,
            height,
            rgba,
        }
    }

    /// Create a solid-color pixel source.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * 4);
        for _ in 0..count {
            data.extend_from_slice(&rgba);
        }
        Self::pixels(width, height, data)
    }

    /// Create an encoded source.
    pub fn encoded(data: Vec<u8>) -> Self {
        RasterSource::Encoded { data }
    }

    /// Size of the payload in bytes.
    pub fn byte_len(&self) -> usize {
        match self {
            RasterSource::Pixels { rgba, .. } => rgba.len(),
            RasterSource::Encoded { data } => data.len(),
        }
    }
}

/// An encoded bitmap held by an image element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Pixel width of the encoded image
    pub width: u32,
    /// Pixel height of the encoded image
    pub height: u32,
    /// MIME type of `data`
    pub mime_type: String,
    /// Encoded image bytes
    pub data: Vec<u8>,
}

impl Bitmap {
    /// Wrap PNG bytes.
    pub fn png(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            mime_type: "image/png".to_string(),
            data,
        }
    }

    /// Render as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            BASE64_STANDARD.encode(&self.data)
        )
    }

    /// Parse a base64 `data:` URI. Dimensions are read from the image header.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| Error::Serialization("bitmap source is not a data URI".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::Serialization("data URI has no payload".into()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::Serialization("data URI is not base64 encoded".into()))?;
        let data = BASE64_STANDARD
            .decode(payload)
            .map_err(|e| Error::Serialization(format!("invalid base64 payload: {}", e)))?;

        let (width, height) = image::ImageReader::new(std::io::Cursor::new(&data))
            .with_guessed_format()?
            .into_dimensions()?;

        Ok(Self {
            width,
            height,
            mime_type: mime_type.to_string(),
            data,
        })
    }

    /// Size of the encoded data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[derive(Serialize, Deserialize)]
struct BitmapRepr {
    src: String,
    width: u32,
    height: u32,
}

impl Serialize for Bitmap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        BitmapRepr {
            src: self.to_data_uri(),
            width: self.width,
            height: self.height,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bitmap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = BitmapRepr::deserialize(deserializer)?;
        Bitmap::from_data_uri(&repr.src).map_err(D::Error::custom)
    }
}

mod base64_bytes {
    use super::BASE64_STANDARD;
    use base64::Engine as _;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64_STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64_STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_data_uri_reads_dimensions() {
        let bitmap = Bitmap::png(3, 2, tiny_png());
        let uri = bitmap.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));

        let parsed = Bitmap::from_data_uri(&uri).unwrap();
        assert_eq!(parsed, bitmap);
    }

    #[test]
    fn test_data_uri_rejects_plain_url() {
        assert!(Bitmap::from_data_uri("https://example.com/a.png").is_err());
    }

    #[test]
    fn test_solid_source_len() {
        let source = RasterSource::solid(4, 3, [1, 2, 3, 4]);
        assert_eq!(source.byte_len(), 48);
    }
}
