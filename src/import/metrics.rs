//! Typographic unit conversion.
//!
//! Documents store sizes in points at 72 dpi; the editable model works in
//! CSS pixels at 96 dpi.

use crate::error::{Error, Result};
use crate::model::{FontSizeSource, StyleRun};

/// Point size used when a style carries none.
pub const DEFAULT_FONT_SIZE_PT: f64 = 16.0;

/// Line height used when a style carries no leading.
pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;

const LINE_HEIGHT_RANGE: (f64, f64) = (0.8, 3.0);
const LETTER_SPACING_RANGE: (f64, f64) = (-0.5, 2.0);

/// Convert points to pixels.
pub fn pt_to_px(pt: f64) -> f64 {
    pt * 96.0 / 72.0
}

/// Convert pixels to points.
pub fn px_to_pt(px: f64) -> f64 {
    px * 72.0 / 96.0
}

/// A pixel font size and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFontSize {
    pub px: f64,
    pub source: FontSizeSource,
    /// Point size the pixel size was derived from
    pub original_pt: Option<f64>,
}

/// Resolve the pixel font size of a style.
///
/// A positive implied size is used as-is; otherwise the point size (16pt when
/// absent) is converted.
pub fn resolve_font_size_px(style: &StyleRun) -> ResolvedFontSize {
    match style.implied_font_size {
        Some(px) if px > 0.0 => ResolvedFontSize {
            px,
            source: FontSizeSource::Implied,
            original_pt: style.font_size,
        },
        _ => {
            let pt = style.font_size.unwrap_or(DEFAULT_FONT_SIZE_PT);
            ResolvedFontSize {
                px: pt_to_px(pt),
                source: FontSizeSource::Derived,
                original_pt: Some(pt),
            }
        }
    }
}

/// Horizontal and vertical scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl ScaleFactors {
    /// Check if both factors are 1.
    pub fn is_identity(&self) -> bool {
        self.x == 1.0 && self.y == 1.0
    }
}

/// Combine percentage scales and the transform into scale factors.
pub fn resolve_scale(style: &StyleRun) -> ScaleFactors {
    let mut scale = ScaleFactors::default();

    if let Some(h) = style.horizontal_scale {
        scale.x *= h / 100.0;
    }
    if let Some(v) = style.vertical_scale {
        scale.y *= v / 100.0;
    }

    if let Some([xx, xy, yx, yy, _, _]) = style.transform {
        let sx = (xx * xx + xy * xy).sqrt();
        let sy = (yx * yx + yy * yy).sqrt();
        if sx > 0.0 {
            scale.x *= sx;
        }
        if sy > 0.0 {
            scale.y *= sy;
        }
    }

    scale
}

/// Unitless line height for a style at the given pixel size.
pub fn resolve_line_height(style: &StyleRun, font_size_px: f64) -> f64 {
    match style.leading {
        Some(leading) if leading > 0.0 && font_size_px > 0.0 => {
            (pt_to_px(leading) / font_size_px).clamp(LINE_HEIGHT_RANGE.0, LINE_HEIGHT_RANGE.1)
        }
        _ => DEFAULT_LINE_HEIGHT,
    }
}

/// Letter spacing in em.
pub fn resolve_letter_spacing(style: &StyleRun) -> f64 {
    style
        .tracking
        .map(|t| (t as f64 / 1000.0).clamp(LETTER_SPACING_RANGE.0, LETTER_SPACING_RANGE.1))
        .unwrap_or(0.0)
}

/// Every text metric of a style, ready for an editable element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub font_size_px: f64,
    pub font_size_source: FontSizeSource,
    pub original_font_size_pt: Option<f64>,
    pub line_height: f64,
    pub letter_spacing: f64,
    pub scale: ScaleFactors,
    /// Whether `scale` was multiplied into size and spacing
    pub scale_applied: bool,
}

/// Reject style values no metric can be derived from.
///
/// Sizes and scales must be finite and positive when present; leading and
/// the transform must be finite.
pub fn validate_style(style: &StyleRun) -> Result<()> {
    let positive = [
        ("font size", style.font_size),
        ("horizontal scale", style.horizontal_scale),
        ("vertical scale", style.vertical_scale),
    ];
    for (what, value) in positive {
        if let Some(v) = value {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::MalformedStyle(format!("{} {}", what, v)));
            }
        }
    }

    if let Some(v) = style.implied_font_size {
        if !v.is_finite() {
            return Err(Error::MalformedStyle(format!("implied font size {}", v)));
        }
    }
    if let Some(v) = style.leading {
        if !v.is_finite() {
            return Err(Error::MalformedStyle(format!("leading {}", v)));
        }
    }
    if let Some(transform) = style.transform {
        if transform.iter().any(|v| !v.is_finite()) {
            return Err(Error::MalformedStyle(format!("transform {:?}", transform)));
        }
    }

    Ok(())
}

/// Resolve all metrics of a style.
///
/// Scale factors are applied only to point-derived sizes; an implied pixel
/// size already includes them.
pub fn resolve_text_metrics(style: &StyleRun) -> Result<TextMetrics> {
    validate_style(style)?;

    let size = resolve_font_size_px(style);
    let scale = resolve_scale(style);
    let line_height = resolve_line_height(style, size.px);
    let mut letter_spacing = resolve_letter_spacing(style);
    let mut font_size_px = size.px;

    let scale_applied = size.source == FontSizeSource::Derived && !scale.is_identity();
    if scale_applied {
        font_size_px *= scale.y;
        letter_spacing *= scale.x;
    }

    if !font_size_px.is_finite() || font_size_px <= 0.0 {
        return Err(Error::MalformedStyle(format!(
            "resolved font size {}px",
            font_size_px
        )));
    }

    Ok(TextMetrics {
        font_size_px,
        font_size_source: size.source,
        original_font_size_pt: size.original_pt,
        line_height,
        letter_spacing,
        scale,
        scale_applied,
    })
}
