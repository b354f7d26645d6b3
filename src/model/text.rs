//! Type layer data as decoded from the document.

use serde::{Deserialize, Serialize};

/// Text content of a type layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextData {
    /// The literal text (paragraphs separated by `\r` in documents)
    pub text: String,

    /// Style runs, in text order
    #[serde(default)]
    pub runs: Vec<StyleRun>,

    /// Layer-level default style
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_style: Option<StyleRun>,
}

impl TextData {
    /// Create text data with no style information.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            runs: Vec::new(),
            default_style: None,
        }
    }

    /// Add a style run.
    pub fn with_run(mut self, run: StyleRun) -> Self {
        self.runs.push(run);
        self
    }

    /// Set the layer-level default style.
    pub fn with_default_style(mut self, style: StyleRun) -> Self {
        self.default_style = Some(style);
        self
    }
}

/// One set of typographic properties applied to a span of text.
///
/// Every field is optional; documents written by different tools fill in
/// different subsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleRun {
    /// Font name (PostScript or family name)
    pub font_name: Option<String>,

    /// Nominal font size in points
    pub font_size: Option<f64>,

    /// Font size already expressed in pixels by the authoring tool
    pub implied_font_size: Option<f64>,

    /// Fill color
    pub fill_color: Option<RawColor>,

    /// Tracking in thousandths of an em
    pub tracking: Option<i32>,

    /// Leading in points
    pub leading: Option<f64>,

    /// Horizontal scale in percent
    pub horizontal_scale: Option<f64>,

    /// Vertical scale in percent
    pub vertical_scale: Option<f64>,

    /// Affine transform `[xx, xy, yx, yy, tx, ty]`
    pub transform: Option<[f64; 6]>,

    /// Paragraph alignment
    pub alignment: Option<RawAlignment>,

    pub faux_bold: Option<bool>,
    pub faux_italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
}

impl StyleRun {
    /// Create an empty style run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no property is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set font name.
    pub fn with_font(mut self, name: impl Into<String>) -> Self {
        self.font_name = Some(name.into());
        self
    }

    /// Set nominal size in points.
    pub fn with_size_pt(mut self, pt: f64) -> Self {
        self.font_size = Some(pt);
        self
    }

    /// Set implied size in pixels.
    pub fn with_implied_size(mut self, px: f64) -> Self {
        self.implied_font_size = Some(px);
        self
    }

    /// Set fill color.
    pub fn with_color(mut self, color: RawColor) -> Self {
        self.fill_color = Some(color);
        self
    }

    /// Set alignment.
    pub fn with_alignment(mut self, alignment: RawAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }
}

/// An RGB color whose channels are either 0-1 floats or 0-255 values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl RawColor {
    /// Create a color from channel values.
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Black.
    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Alignment as stored by the authoring tool: a name or a numeric code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAlignment {
    /// Numeric justification code (0 = left, 1 = center, 2 = right, 3 = justify)
    Code(i64),
    /// Textual alignment name
    Named(String),
}

impl From<&str> for RawAlignment {
    fn from(value: &str) -> Self {
        RawAlignment::Named(value.to_string())
    }
}

impl From<i64> for RawAlignment {
    fn from(value: i64) -> Self {
        RawAlignment::Code(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_run_is_empty() {
        assert!(StyleRun::new().is_empty());
        assert!(!StyleRun::new().with_size_pt(12.0).is_empty());
    }

    #[test]
    fn test_raw_alignment_untagged() {
        let code: RawAlignment = serde_json::from_str("2").unwrap();
        assert_eq!(code, RawAlignment::Code(2));

        let named: RawAlignment = serde_json::from_str("\"center\"").unwrap();
        assert_eq!(named, RawAlignment::Named("center".to_string()));
    }
}
