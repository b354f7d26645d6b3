//! Element to layer conversion.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fonts::{FontFamily, FontResolver};
use crate::import::px_to_pt;
use crate::model::{
    Bounds, DocumentTree, Element, ElementContent, LayerDescriptor, LayerNode, Page, RasterSource,
    RawAlignment, RawColor, StyleRun, TextContent, TextData,
};
use crate::options::ConvertOptions;
use crate::raster::{parse_css_color, Rasterizer, TextRenderSpec};

/// Converts editable elements back into document layers.
#[derive(Debug, Clone)]
pub struct ExportConverter {
    rasterizer: Rasterizer,
}

/// Layers of one page and the number of elements that could not be
/// converted.
#[derive(Debug, Clone)]
pub struct PageLayers {
    pub document: DocumentTree,
    pub failed_elements: u32,
}

impl ExportConverter {
    /// Create a converter.
    pub fn new(options: ConvertOptions, fonts: Arc<dyn FontResolver>) -> Self {
        Self {
            rasterizer: Rasterizer::new(options, fonts),
        }
    }

    /// Convert one element.
    pub fn convert_element(&self, element: &Element) -> Result<LayerDescriptor> {
        let bounds = element_bounds(element)?;
        let (width, height) = (bounds.width(), bounds.height());

        let mut layer = LayerNode::new(element.name.clone(), bounds)
            .with_opacity(opacity_to_byte(element.opacity))
            .with_blend_mode(element.blend_mode.to_source());
        layer.hidden = !element.visible;

        let bitmap = match &element.content {
            ElementContent::Text(content) => {
                let spec = TextRenderSpec::from_content(content);
                layer.text = Some(text_data(content, &spec));
                self.rasterizer.render_text(&spec, width, height)?
            }
            ElementContent::Image(image) => self.rasterizer.redraw(&image.src, width, height)?,
            ElementContent::Shape | ElementContent::Unknown => {
                let rgba = element
                    .fill
                    .as_deref()
                    .and_then(parse_css_color)
                    .unwrap_or([0, 0, 0, 0]);
                if matches!(element.content, ElementContent::Unknown) {
                    log::debug!(
                        "Element '{}' of unknown kind exported as flat fill",
                        element.name
                    );
                } else if rgba[3] > 0 {
                    layer.fill_color = Some(RawColor::new(
                        rgba[0] as f64,
                        rgba[1] as f64,
                        rgba[2] as f64,
                    ));
                }
                self.rasterizer.fill(rgba, width, height)?
            }
        };

        layer.raster = Some(RasterSource::encoded(bitmap.data));
        Ok(layer)
    }

    /// Convert every element of a page, bottom-most first.
    ///
    /// Elements that fail are logged and left out.
    pub fn convert_page(&self, page: &Page) -> PageLayers {
        let mut document = DocumentTree::new(page.width, page.height);
        let mut failed_elements = 0;

        for element in &page.elements {
            match self.convert_element(element) {
                Ok(layer) => document.add_layer(layer),
                Err(e) => {
                    failed_elements += 1;
                    log::warn!(
                        "Element '{}' on page '{}' skipped: {}",
                        element.name,
                        page.name,
                        e
                    );
                }
            }
        }

        PageLayers {
            document,
            failed_elements,
        }
    }
}

/// `round(opacity * 255)`, clamped.
pub fn opacity_to_byte(opacity: f64) -> u8 {
    if opacity.is_nan() {
        return 255;
    }
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Integer bounds from the rounded frame. Width and height are at least 1.
pub fn element_bounds(element: &Element) -> Result<Bounds> {
    let frame = [element.x, element.y, element.width, element.height];
    if frame.iter().any(|v| !v.is_finite()) {
        return Err(Error::Raster(format!(
            "element '{}' has a non-finite frame",
            element.name
        )));
    }

    let to_i32 = |v: f64| v.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
    let left = to_i32(element.x);
    let top = to_i32(element.y);
    let width = to_i32(element.width).max(1);
    let height = to_i32(element.height).max(1);

    Ok(Bounds::new(
        left,
        top,
        left.saturating_add(width),
        top.saturating_add(height),
    ))
}

/// Editable text record for a text element, as a single style run.
fn text_data(content: &TextContent, spec: &TextRenderSpec) -> TextData {
    let family = FontFamily::parse_css(&content.font_family);
    let [r, g, b, _] = spec.color;

    let run = StyleRun {
        font_name: Some(family.primary().to_string()),
        font_size: Some(px_to_pt(content.font_size)),
        fill_color: Some(RawColor::new(r as f64, g as f64, b as f64)),
        tracking: Some((content.letter_spacing * 1000.0).round() as i32),
        leading: Some(px_to_pt(content.line_height * content.font_size)),
        alignment: Some(RawAlignment::Named(content.align.as_str().to_string())),
        faux_bold: Some(content.bold),
        faux_italic: Some(content.italic),
        underline: Some(content.underline),
        strikethrough: Some(content.strikethrough),
        ..Default::default()
    };

    TextData::new(content.text.replace('\n', "\r")).with_run(run)
}
