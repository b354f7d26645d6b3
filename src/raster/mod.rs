//! Rasterization of layer pixels and text into encoded bitmaps.
//!
//! All output is lossless PNG. Surfaces are created per call and dropped
//! when the bitmap has been encoded.

pub mod surface;
pub mod text;

pub use surface::{parse_css_color, sharpen, SHARPEN_KERNEL};
pub use text::TextRenderSpec;

use std::sync::Arc;

use crate::error::Result;
use crate::fonts::{resolve_stack, FontFamily, FontResolver, MemoryFontResolver};
use crate::model::{Alignment, Bitmap, RasterSource};
use crate::options::ConvertOptions;

/// Produces bitmaps for layers and elements.
#[derive(Clone)]
pub struct Rasterizer {
    options: ConvertOptions,
    fonts: Arc<dyn FontResolver>,
}

impl Rasterizer {
    /// Create a rasterizer with a font resolver.
    pub fn new(options: ConvertOptions, fonts: Arc<dyn FontResolver>) -> Self {
        Self { options, fonts }
    }

    /// Create a rasterizer that knows no fonts.
    ///
    /// Text is not drawn; surfaces stay transparent.
    pub fn without_fonts(options: ConvertOptions) -> Self {
        Self::new(options, Arc::new(MemoryFontResolver::new()))
    }

    /// Get the options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Get the font resolver.
    pub fn fonts(&self) -> &Arc<dyn FontResolver> {
        &self.fonts
    }

    /// Draw a layer raster into a `width` x `height` box.
    ///
    /// With `enhance` the result is upscaled by the configured factor and
    /// sharpened, so the bitmap is larger than the box.
    pub fn rasterize(
        &self,
        source: &RasterSource,
        width: u32,
        height: u32,
        enhance: bool,
    ) -> Result<Bitmap> {
        let decoded = surface::decode_source(source)?;
        let fitted = surface::fit_to_box(decoded, width, height);

        if !enhance {
            return surface::encode_png(&fitted);
        }

        let factor = self.options.enhance_quality.factor();
        let upscaled = surface::upscale(&fitted, factor);
        let sharpened = surface::sharpen(&upscaled, self.options.parallel);
        log::debug!(
            "Enhanced {}x{} raster to {}x{}",
            width,
            height,
            sharpened.width(),
            sharpened.height()
        );
        surface::encode_png(&sharpened)
    }

    /// Redraw an encoded bitmap into a `width` x `height` box.
    pub fn redraw(&self, bitmap: &Bitmap, width: u32, height: u32) -> Result<Bitmap> {
        let decoded = surface::decode_bitmap(bitmap)?;
        surface::encode_png(&surface::fit_to_box(decoded, width, height))
    }

    /// Render text into a `width` x `height` box.
    ///
    /// When no family in the stack resolves, the bitmap is left transparent.
    pub fn render_text(&self, spec: &TextRenderSpec, width: u32, height: u32) -> Result<Bitmap> {
        let mut pixmap = surface::new_pixmap(width, height)?;

        match resolve_stack(self.fonts.as_ref(), &spec.family) {
            Some(font) => {
                let drawn = text::draw_text(&mut pixmap, &font, spec)?;
                log::debug!("Drew {} glyphs with '{}'", drawn, font.family);
            }
            None => {
                log::warn!(
                    "Text '{}' left blank: no font for {}",
                    truncate(&spec.text, 32),
                    spec.family.to_css()
                );
            }
        }

        surface::encode_png(&surface::rgba_from_pixmap(&pixmap)?)
    }

    /// Solid `rgba` rectangle.
    pub fn fill(&self, rgba: [u8; 4], width: u32, height: u32) -> Result<Bitmap> {
        surface::encode_png(&surface::solid(width, height, rgba))
    }

    /// Placeholder bitmap in the configured color, labelled when a font is
    /// available.
    pub fn placeholder(&self, label: &str, width: u32, height: u32) -> Result<Bitmap> {
        let base = surface::solid(width, height, self.options.placeholder_color);
        if label.is_empty() {
            return surface::encode_png(&base);
        }

        let family = FontFamily::parse_css("Arial, sans-serif");
        let Some(font) = resolve_stack(self.fonts.as_ref(), &family) else {
            return surface::encode_png(&base);
        };

        let mut pixmap = surface::pixmap_from_rgba(&base)?;
        let font_size = (height as f32 * 0.25).clamp(6.0, 24.0);
        let spec = TextRenderSpec::new(label, family, font_size)
            .with_color([80, 80, 80, 255])
            .with_align(Alignment::Center);
        text::draw_text(&mut pixmap, &font, &spec)?;

        surface::encode_png(&surface::rgba_from_pixmap(&pixmap)?)
    }
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}
