//! Editable scene elements.

use super::Bitmap;
use serde::{Deserialize, Serialize};

/// A positioned, styled element on an editable page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Unique id, regenerated on every conversion
    pub id: String,

    /// Display name (the source layer name on import)
    #[serde(default)]
    pub name: String,

    /// Left edge in pixels
    pub x: f64,

    /// Top edge in pixels
    pub y: f64,

    /// Width in pixels
    pub width: f64,

    /// Height in pixels
    pub height: f64,

    /// Rotation in degrees
    #[serde(default)]
    pub rotation: f64,

    /// Opacity in [0, 1]
    pub opacity: f64,

    /// Visibility
    pub visible: bool,

    /// Compositing rule
    #[serde(default)]
    pub blend_mode: BlendMode,

    /// Declared fill color (CSS form), used for shapes and as export fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,

    /// Kind-specific content
    #[serde(flatten)]
    pub content: ElementContent,
}

impl Element {
    /// Create an element with default placement for the given content.
    pub fn new(content: ElementContent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: String::new(),
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            rotation: 0.0,
            opacity: 1.0,
            visible: true,
            blend_mode: BlendMode::Normal,
            fill: None,
            content,
        }
    }

    /// Set position and size.
    pub fn with_frame(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self
    }

    /// Set display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set fill color.
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Element kind name as serialized.
    pub fn kind(&self) -> &'static str {
        match self.content {
            ElementContent::Text(_) => "text",
            ElementContent::Image(_) => "image",
            ElementContent::Shape => "shape",
            ElementContent::Unknown => "unknown",
        }
    }

    /// Check if this is a text element.
    pub fn is_text(&self) -> bool {
        matches!(self.content, ElementContent::Text(_))
    }

    /// Check if this is an image element.
    pub fn is_image(&self) -> bool {
        matches!(self.content, ElementContent::Image(_))
    }

    /// Text content, if any.
    pub fn as_text(&self) -> Option<&TextContent> {
        match &self.content {
            ElementContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Image content, if any.
    pub fn as_image(&self) -> Option<&ImageContent> {
        match &self.content {
            ElementContent::Image(image) => Some(image),
            _ => None,
        }
    }
}

/// Kind-specific element content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementContent {
    /// Editable text
    Text(TextContent),

    /// A bitmap
    Image(ImageContent),

    /// A rectangle filled with the element's `fill`
    Shape,

    /// Any element kind this library does not know
    #[serde(other)]
    Unknown,
}

/// Editable text properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,

    /// CSS font family stack, original family first
    pub font_family: String,

    /// Font size in pixels
    pub font_size: f64,

    /// Text color as `rgb(r,g,b)`
    pub color: String,

    pub align: Alignment,

    /// Unitless line height ratio
    pub line_height: f64,

    /// Letter spacing in em
    pub letter_spacing: f64,

    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikethrough: bool,

    /// Provenance of the converted metrics
    #[serde(default)]
    pub metadata: TextMetadata,
}

/// Where the text metrics of an imported element came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextMetadata {
    /// Nominal point size in the source document
    pub original_font_size_pt: Option<f64>,

    /// How the pixel font size was obtained
    pub font_size_source: FontSizeSource,

    /// Horizontal scale factor found in the style
    pub scale_x: f64,

    /// Vertical scale factor found in the style
    pub scale_y: f64,

    /// Whether the scale factors were multiplied into size and spacing
    pub scale_applied: bool,

    /// Font name as written in the document
    pub original_font_name: Option<String>,
}

/// Origin of a pixel font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSizeSource {
    /// Taken as-is from a pixel size supplied by the authoring tool
    Implied,
    /// Converted from a point size
    #[default]
    Derived,
}

/// Bitmap element properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageContent {
    /// Encoded bitmap
    pub src: Bitmap,

    #[serde(default)]
    pub metadata: ImageMetadata,
}

/// Provenance flags of an image element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Upscaled and sharpened during import
    pub enhanced: bool,

    /// Originates from a type layer
    pub from_text_layer: bool,

    /// Text of the originating type layer, kept for later re-editing
    pub original_text: Option<String>,

    /// Text was rasterized instead of imported as editable text
    pub rasterized: bool,

    /// Source pixels could not be read and a placeholder was drawn instead
    pub placeholder: bool,

    /// Pixel size of the source content before enhancement
    pub source_width: Option<u32>,
    pub source_height: Option<u32>,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compositing rule of an element.
///
/// The serialized names are the CSS `mix-blend-mode` keywords. Document keys
/// are translated with [`BlendMode::from_source`] and [`BlendMode::to_source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// The top color replaces the bottom color.
    #[default]
    Normal,
    /// Top and bottom colors are multiplied; darkens.
    Multiply,
    /// Inverted colors are multiplied and inverted again; lightens.
    Screen,
    /// Multiply or screen depending on the bottom color.
    Overlay,
    /// Per-channel minimum.
    Darken,
    /// Per-channel maximum.
    Lighten,
    ColorDodge,
    ColorBurn,
    /// Multiply or screen depending on the top color.
    HardLight,
    /// A softer [HardLight](BlendMode::HardLight).
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

/// (mode, document key, PSD channel key)
const BLEND_TABLE: &[(BlendMode, &str, &str)] = &[
    (BlendMode::Normal, "normal", "norm"),
    (BlendMode::Multiply, "multiply", "mul "),
    (BlendMode::Screen, "screen", "scrn"),
    (BlendMode::Overlay, "overlay", "over"),
    (BlendMode::Darken, "darken", "dark"),
    (BlendMode::Lighten, "lighten", "lite"),
    (BlendMode::ColorDodge, "colorDodge", "div "),
    (BlendMode::ColorBurn, "colorBurn", "idiv"),
    (BlendMode::HardLight, "hardLight", "hLit"),
    (BlendMode::SoftLight, "softLight", "sLit"),
    (BlendMode::Difference, "difference", "diff"),
    (BlendMode::Exclusion, "exclusion", "smud"),
    (BlendMode::Hue, "hue", "hue "),
    (BlendMode::Saturation, "saturation", "sat "),
    (BlendMode::Color, "color", "colr"),
    (BlendMode::Luminosity, "luminosity", "lum "),
];

impl BlendMode {
    /// Every mode, in table order.
    pub fn all() -> impl Iterator<Item = BlendMode> {
        BLEND_TABLE.iter().map(|(mode, _, _)| *mode)
    }

    /// Map a document blend key to a mode.
    ///
    /// Accepts camelCase keys (`softLight`), spaced names (`soft light`) and
    /// 4-character channel keys (`sLit`). Unknown keys map to `Normal`.
    pub fn from_source(key: &str) -> Self {
        let compact: String = key
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect();

        BLEND_TABLE
            .iter()
            .find(|(_, name, channel_key)| {
                *channel_key == key || name.eq_ignore_ascii_case(&compact)
            })
            .map(|(mode, _, _)| *mode)
            .unwrap_or_default()
    }

    /// Document blend key (camelCase).
    pub fn to_source(self) -> &'static str {
        BLEND_TABLE
            .iter()
            .find(|(mode, _, _)| *mode == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("normal")
    }

    /// 4-character channel key.
    pub fn channel_key(self) -> &'static str {
        BLEND_TABLE
            .iter()
            .find(|(mode, _, _)| *mode == self)
            .map(|(_, _, key)| *key)
            .unwrap_or("norm")
    }

    /// Editable-model name (CSS keyword).
    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Hue => "hue",
            BlendMode::Saturation => "saturation",
            BlendMode::Color => "color",
            BlendMode::Luminosity => "luminosity",
        }
    }

    /// Parse an editable-model name. Unknown names map to `Normal`.
    pub fn from_target(name: &str) -> Self {
        Self::all()
            .find(|mode| mode.as_str() == name)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for BlendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translate a document blend key to the editable-model name.
pub fn blend_to_target(source: &str) -> &'static str {
    BlendMode::from_source(source).as_str()
}

/// Translate an editable-model blend name to the document key.
pub fn blend_to_source(target: &str) -> &'static str {
    BlendMode::from_target(target).to_source()
}
