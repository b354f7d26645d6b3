//! Line-by-line text drawing with glyph outlines.
//!
//! Layout is a single unshaped pass: one glyph per character, advances from
//! the font's horizontal metrics, no bidi reordering and no kerning.

use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Transform};
use ttf_parser::{GlyphId, OutlineBuilder};

use super::surface::parse_css_color;
use crate::error::Result;
use crate::fonts::{FontData, FontFamily};
use crate::model::{Alignment, TextContent};

/// Everything needed to draw a block of text.
#[derive(Debug, Clone)]
pub struct TextRenderSpec {
    pub text: String,
    pub family: FontFamily,
    /// Font size in pixels
    pub font_size: f32,
    /// Straight-alpha RGBA
    pub color: [u8; 4],
    pub align: Alignment,
    /// Unitless line height ratio
    pub line_height: f32,
    /// Letter spacing in em
    pub letter_spacing: f32,
}

impl TextRenderSpec {
    /// Create a spec with default metrics (left aligned, 1.2 line height).
    pub fn new(text: impl Into<String>, family: FontFamily, font_size: f32) -> Self {
        Self {
            text: text.into(),
            family,
            font_size,
            color: [0, 0, 0, 255],
            align: Alignment::Left,
            line_height: 1.2,
            letter_spacing: 0.0,
        }
    }

    /// Build from an editable text element.
    pub fn from_content(content: &TextContent) -> Self {
        let color = parse_css_color(&content.color).unwrap_or_else(|| {
            log::debug!("Unparsable text color '{}', using black", content.color);
            [0, 0, 0, 255]
        });

        Self {
            text: content.text.clone(),
            family: FontFamily::parse_css(&content.font_family),
            font_size: content.font_size as f32,
            color,
            align: content.align,
            line_height: content.line_height as f32,
            letter_spacing: content.letter_spacing as f32,
        }
    }

    /// Set color.
    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    /// Set alignment.
    pub fn with_align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Set line height ratio.
    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    /// Set letter spacing in em.
    pub fn with_letter_spacing(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct GlyphPlacement {
    glyph_id: u16,
    x: f32,
}

struct LineLayout {
    glyphs: Vec<GlyphPlacement>,
    width: f32,
}

fn layout_line(face: &ttf_parser::Face<'_>, line: &str, font_size: f32, spacing_px: f32) -> LineLayout {
    let units_per_em = face.units_per_em().max(1) as f32;
    let scale = font_size / units_per_em;

    let mut glyphs = Vec::new();
    let mut pen_x = 0.0f32;
    let mut count = 0usize;
    for ch in line.chars() {
        count += 1;
        let gid = face.glyph_index(ch).map(|id| id.0).unwrap_or(0);
        if gid == 0 {
            pen_x += font_size * 0.5 + spacing_px;
            continue;
        }
        glyphs.push(GlyphPlacement {
            glyph_id: gid,
            x: pen_x,
        });
        let advance = face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0) as f32 * scale;
        pen_x += if advance > 0.0 { advance } else { font_size * 0.5 };
        pen_x += spacing_px;
    }

    let width = if count > 0 { pen_x - spacing_px } else { 0.0 };
    LineLayout {
        glyphs,
        width: width.max(0.0),
    }
}

/// Draw `spec` onto `pixmap` with `font`, lines starting at the top edge.
///
/// Returns the number of glyph outlines filled.
pub fn draw_text(pixmap: &mut Pixmap, font: &FontData, spec: &TextRenderSpec) -> Result<usize> {
    let face = font.face()?;
    if spec.font_size <= 0.0 || spec.text.is_empty() {
        return Ok(0);
    }

    let units_per_em = face.units_per_em().max(1) as f32;
    let scale = spec.font_size / units_per_em;
    let ascent = face.ascender() as f32 * scale;
    let descent = face.descender() as f32 * scale;
    let line_box = spec.font_size * spec.line_height.max(0.1);
    let half_leading = (line_box - (ascent - descent)) / 2.0;
    let spacing_px = spec.letter_spacing * spec.font_size;
    let box_width = pixmap.width() as f32;

    let mut paint = Paint::default();
    let [r, g, b, a] = spec.color;
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    let mut drawn = 0usize;
    for (i, line) in spec.text.split('\n').enumerate() {
        let layout = layout_line(&face, line, spec.font_size, spacing_px);
        let x0 = match spec.align {
            Alignment::Center => (box_width - layout.width) / 2.0,
            Alignment::Right => box_width - layout.width,
            Alignment::Left | Alignment::Justify => 0.0,
        };
        let baseline = i as f32 * line_box + half_leading + ascent;

        for glyph in layout.glyphs {
            let mut builder = GlyphPathBuilder::new(x0 + glyph.x, baseline, scale);
            if face
                .outline_glyph(GlyphId(glyph.glyph_id), &mut builder)
                .is_none()
            {
                continue;
            }
            let Some(path) = builder.finish() else {
                continue;
            };
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            drawn += 1;
        }
    }

    Ok(drawn)
}

/// Font outline to path, flipping the y-up outline space to y-down.
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale,
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.origin_y - y * self.scale)
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x, y) = self.point(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x2, y2) = self.point(x2, y2);
        let (x, y) = self.point(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
