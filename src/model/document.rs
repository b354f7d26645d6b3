//! Document-level types produced by the codec.

use super::{RasterSource, RawColor, TextData};
use serde::{Deserialize, Serialize};

/// A decoded layered document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    /// Canvas width in pixels
    pub width: u32,

    /// Canvas height in pixels
    pub height: u32,

    /// Color mode of the document
    pub color_mode: ColorMode,

    /// Resolution in dots per inch
    pub resolution: f64,

    /// Top-level layers, bottom-most first
    pub children: Vec<LayerNode>,
}

impl DocumentTree {
    /// Create a new empty RGB document.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            color_mode: ColorMode::Rgb,
            resolution: 72.0,
            children: Vec::new(),
        }
    }

    /// Add a top-level layer.
    pub fn add_layer(&mut self, layer: LayerNode) {
        self.children.push(layer);
    }

    /// Total number of layers, including nested ones.
    pub fn layer_count(&self) -> usize {
        count_nodes(&self.children)
    }

    /// Check if the document has no layers.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Count every node in a layer forest.
pub fn count_nodes(nodes: &[LayerNode]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + count_nodes(&node.children))
        .sum()
}

/// Document color mode as stored in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Bitmap,
    Grayscale,
    Indexed,
    #[default]
    Rgb,
    Cmyk,
    Multichannel,
    Duotone,
    Lab,
}

impl ColorMode {
    /// Map a header color mode code.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(ColorMode::Bitmap),
            1 => Some(ColorMode::Grayscale),
            2 => Some(ColorMode::Indexed),
            3 => Some(ColorMode::Rgb),
            4 => Some(ColorMode::Cmyk),
            7 => Some(ColorMode::Multichannel),
            8 => Some(ColorMode::Duotone),
            9 => Some(ColorMode::Lab),
            _ => None,
        }
    }

    /// Header code for this color mode.
    pub fn code(self) -> u16 {
        match self {
            ColorMode::Bitmap => 0,
            ColorMode::Grayscale => 1,
            ColorMode::Indexed => 2,
            ColorMode::Rgb => 3,
            ColorMode::Cmyk => 4,
            ColorMode::Multichannel => 7,
            ColorMode::Duotone => 8,
            ColorMode::Lab => 9,
        }
    }
}

/// Layer bounding box in canvas pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    /// Create bounds from edges.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width, never below 1.
    pub fn width(&self) -> u32 {
        (self.right as i64 - self.left as i64).max(1) as u32
    }

    /// Height, never below 1.
    pub fn height(&self) -> u32 {
        (self.bottom as i64 - self.top as i64).max(1) as u32
    }

    /// Check if the box encloses no pixels.
    pub fn is_degenerate(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

/// A single layer in the decoded tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerNode {
    /// Layer name
    pub name: String,

    /// Bounding box
    pub bounds: Bounds,

    /// Whether the layer is hidden
    pub hidden: bool,

    /// Opacity (0-255)
    pub opacity: u8,

    /// Blend mode key in the document vocabulary (e.g. "softLight")
    pub blend_mode: String,

    /// Text content for type layers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextData>,

    /// Pixel content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raster: Option<RasterSource>,

    /// Fill color for solid color fill layers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<RawColor>,

    /// Nested layers (empty for leaf layers)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayerNode>,
}

impl LayerNode {
    /// Create a new empty, visible, fully opaque layer.
    pub fn new(name: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            name: name.into(),
            bounds,
            hidden: false,
            opacity: 255,
            blend_mode: "normal".to_string(),
            text: None,
            raster: None,
            fill_color: None,
            children: Vec::new(),
        }
    }

    /// Create a group layer with children.
    pub fn group(name: impl Into<String>, children: Vec<LayerNode>) -> Self {
        let mut node = Self::new(name, Bounds::default());
        node.children = children;
        node
    }

    /// Set pixel content.
    pub fn with_raster(mut self, raster: RasterSource) -> Self {
        self.raster = Some(raster);
        self
    }

    /// Set text content.
    pub fn with_text(mut self, text: TextData) -> Self {
        self.text = Some(text);
        self
    }

    /// Set solid fill color.
    pub fn with_fill_color(mut self, color: RawColor) -> Self {
        self.fill_color = Some(color);
        self
    }

    /// Set opacity.
    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set blend mode key.
    pub fn with_blend_mode(mut self, blend_mode: impl Into<String>) -> Self {
        self.blend_mode = blend_mode.into();
        self
    }

    /// Mark the layer hidden.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Add a child layer.
    pub fn add_child(&mut self, child: LayerNode) {
        self.children.push(child);
    }

    /// Check if this layer has nested layers.
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Check if this is a type layer.
    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }
}
