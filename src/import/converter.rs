//! Layer to element conversion.

use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;

use super::flatten::FlatLayer;
use super::metrics::resolve_text_metrics;
use super::style::{
    font_family_stack, map_alignment, normalize_color, FontNameHints, StyleChain,
};
use super::ImportResult;
use crate::error::Result;
use crate::fonts::FontResolver;
use crate::model::{
    Bitmap, BlendMode, Element, ElementContent, ImageContent, ImageMetadata, LayerNode,
    RasterSource, RawColor, TextContent, TextData, TextMetadata,
};
use crate::options::{ConvertOptions, OpacityPolicy};
use crate::raster::{surface, Rasterizer, TextRenderSpec};
use crate::report::{ImportSummary, LayerOutcome, SkipReason};

/// Converts flattened layers into editable elements.
#[derive(Debug)]
pub struct ImportConverter {
    options: ConvertOptions,
    rasterizer: Rasterizer,
    styles: StyleChain,
    hints: FontNameHints,
}

impl ImportConverter {
    /// Create a converter.
    pub fn new(options: ConvertOptions, fonts: Arc<dyn FontResolver>) -> Self {
        Self {
            rasterizer: Rasterizer::new(options.clone(), fonts),
            options,
            styles: StyleChain::default(),
            hints: FontNameHints::new(),
        }
    }

    /// Replace the style strategy chain.
    pub fn with_style_chain(mut self, styles: StyleChain) -> Self {
        self.styles = styles;
        self
    }

    /// Get the options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert one layer.
    ///
    /// Returns `Ok(None)` for hidden layers and layers with nothing to
    /// convert.
    pub fn convert_layer(&self, layer: &FlatLayer<'_>) -> Result<Option<Element>> {
        if layer.is_hidden() {
            log::debug!("Skipping hidden layer '{}'", layer.name());
            return Ok(None);
        }

        let node = layer.node;
        let content = if let Some(text) = &node.text {
            if self.options.rasterize_text {
                self.rasterized_text(node, text)?
            } else {
                ElementContent::Text(self.text_content(text)?)
            }
        } else if let Some(raster) = &node.raster {
            self.raster_image(node, raster)?
        } else if node.fill_color.is_some() {
            ElementContent::Shape
        } else {
            return Ok(None);
        };

        let mut element = self.base_element(node, content);
        if let (ElementContent::Shape, Some(color)) = (&element.content, &node.fill_color) {
            element.fill = Some(normalize_color(color));
        }
        Ok(Some(element))
    }

    /// Convert one layer and report what happened.
    ///
    /// Errors are turned into [`LayerOutcome::Failed`].
    pub fn convert_with_outcome(&self, layer: &FlatLayer<'_>) -> (LayerOutcome, Option<Element>) {
        if layer.is_hidden() {
            return (
                LayerOutcome::Skipped {
                    reason: SkipReason::Hidden,
                },
                None,
            );
        }

        match self.convert_layer(layer) {
            Ok(Some(element)) => (LayerOutcome::Converted, Some(element)),
            Ok(None) => (
                LayerOutcome::Skipped {
                    reason: SkipReason::NoContent,
                },
                None,
            ),
            Err(e) => {
                log::warn!("Layer '{}' failed to convert: {}", layer.name(), e);
                (
                    LayerOutcome::Failed {
                        message: e.to_string(),
                    },
                    None,
                )
            }
        }
    }

    /// Outcome of converting one layer.
    pub fn classify(&self, layer: &FlatLayer<'_>) -> LayerOutcome {
        self.convert_with_outcome(layer).0
    }

    /// Convert every layer in flattened order.
    ///
    /// A failing layer never stops its siblings.
    pub fn import_layers(&self, layers: &[FlatLayer<'_>]) -> ImportResult {
        let mut elements = Vec::new();
        let mut summary = ImportSummary::new();

        for layer in layers {
            let (outcome, element) = self.convert_with_outcome(layer);
            summary.record(&outcome);

            if let Some(element) = element {
                if let Some(image) = element.as_image() {
                    if image.metadata.rasterized {
                        summary.rasterized_text += 1;
                    }
                    if image.metadata.placeholder {
                        summary.placeholders += 1;
                    }
                }
                elements.push(element);
            }
        }

        log::info!(
            "Imported {} of {} layers ({} skipped, {} failed)",
            summary.converted,
            summary.total,
            summary.skipped,
            summary.failed
        );

        ImportResult { elements, summary }
    }

    fn base_element(&self, node: &LayerNode, content: ElementContent) -> Element {
        if self.options.opacity_policy == OpacityPolicy::ForceOpaque && node.opacity != 255 {
            log::debug!(
                "Layer '{}' opacity {} imported as opaque",
                node.name,
                node.opacity
            );
        }

        let mut element = Element::new(content)
            .with_name(node.name.clone())
            .with_frame(
                node.bounds.left as f64,
                node.bounds.top as f64,
                node.bounds.width() as f64,
                node.bounds.height() as f64,
            );
        element.opacity = self.options.opacity_policy.apply(node.opacity);
        element.blend_mode = BlendMode::from_source(&node.blend_mode);
        element
    }

    fn text_content(&self, data: &TextData) -> Result<TextContent> {
        let (style, strategy) = self.styles.select(data);
        log::debug!("Text style from {}", strategy);

        let metrics = resolve_text_metrics(&style)?;
        let (bold, italic) = self.hints.resolve(&style);

        Ok(TextContent {
            text: normalize_text(&data.text),
            font_family: font_family_stack(&style).to_css(),
            font_size: metrics.font_size_px,
            color: normalize_color(&style.fill_color.unwrap_or_else(RawColor::black)),
            align: map_alignment(style.alignment.as_ref()),
            line_height: metrics.line_height,
            letter_spacing: metrics.letter_spacing,
            bold,
            italic,
            underline: style.underline.unwrap_or(false),
            strikethrough: style.strikethrough.unwrap_or(false),
            metadata: TextMetadata {
                original_font_size_pt: metrics.original_font_size_pt,
                font_size_source: metrics.font_size_source,
                scale_x: metrics.scale.x,
                scale_y: metrics.scale.y,
                scale_applied: metrics.scale_applied,
                original_font_name: style.font_name.clone(),
            },
        })
    }

    fn rasterized_text(&self, node: &LayerNode, data: &TextData) -> Result<ElementContent> {
        let (width, height) = (node.bounds.width(), node.bounds.height());

        let rendered = match &node.raster {
            Some(raster) => self.rasterizer.rasterize(raster, width, height, false),
            None => {
                let spec = TextRenderSpec::from_content(&self.text_content(data)?);
                self.rasterizer.render_text(&spec, width, height)
            }
        };
        let (src, placeholder) = self.or_placeholder(node, rendered)?;

        Ok(ElementContent::Image(ImageContent {
            src,
            metadata: ImageMetadata {
                from_text_layer: true,
                original_text: Some(normalize_text(&data.text)),
                rasterized: true,
                placeholder,
                source_width: Some(width),
                source_height: Some(height),
                ..Default::default()
            },
        }))
    }

    fn raster_image(&self, node: &LayerNode, raster: &RasterSource) -> Result<ElementContent> {
        let (width, height) = (node.bounds.width(), node.bounds.height());
        let enhance = self.options.enhance_images;
        let source_size = surface::source_dimensions(raster);

        let rendered = self.rasterizer.rasterize(raster, width, height, enhance);
        let (src, placeholder) = self.or_placeholder(node, rendered)?;

        Ok(ElementContent::Image(ImageContent {
            src,
            metadata: ImageMetadata {
                enhanced: enhance && !placeholder,
                placeholder,
                source_width: source_size.map(|(w, _)| w),
                source_height: source_size.map(|(_, h)| h),
                ..Default::default()
            },
        }))
    }

    /// Substitute a placeholder for a bitmap that could not be produced.
    fn or_placeholder(&self, node: &LayerNode, rendered: Result<Bitmap>) -> Result<(Bitmap, bool)> {
        match rendered {
            Ok(bitmap) => Ok((bitmap, false)),
            Err(e) => {
                log::warn!("Layer '{}' pixels unreadable, using placeholder: {}", node.name, e);
                let bitmap = self.rasterizer.placeholder(
                    &node.name,
                    node.bounds.width(),
                    node.bounds.height(),
                )?;
                Ok((bitmap, true))
            }
        }
    }
}

/// NFC-normalize and turn document paragraph breaks into newlines.
pub fn normalize_text(text: &str) -> String {
    text.nfc()
        .collect::<String>()
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::MemoryFontResolver;
    use crate::import::flatten::flatten;
    use crate::model::{Bounds, FontSizeSource, StyleRun};

    fn converter(options: ConvertOptions) -> ImportConverter {
        ImportConverter::new(options, Arc::new(MemoryFontResolver::new()))
    }

    fn text_layer() -> LayerNode {
        LayerNode::new("title", Bounds::new(5, 6, 105, 46)).with_text(
            TextData::new("Caf\u{0065}\u{0301}\rline two").with_run(
                StyleRun::new()
                    .with_font("Arial-BoldMT")
                    .with_size_pt(12.0)
                    .with_color(RawColor::new(1.0, 0.0, 0.0))
                    .with_alignment("center".into()),
            ),
        )
    }

    #[test]
    fn test_editable_text_element() {
        let tree = vec![text_layer()];
        let flat = flatten(&tree, None);
        let element = converter(ConvertOptions::new().editable_text())
            .convert_layer(&flat[0])
            .unwrap()
            .unwrap();

        assert_eq!((element.x, element.y, element.width, element.height), (5.0, 6.0, 100.0, 40.0));
        let text = element.as_text().unwrap();
        assert_eq!(text.text, "Caf\u{e9}\nline two");
        assert_eq!(text.font_size, 16.0);
        assert_eq!(text.color, "rgb(255,0,0)");
        assert_eq!(text.align.as_str(), "center");
        assert!(text.bold);
        assert!(text.font_family.starts_with("\"Arial-BoldMT\""));
        assert_eq!(text.metadata.font_size_source, FontSizeSource::Derived);
        assert_eq!(text.metadata.original_font_size_pt, Some(12.0));
    }

    #[test]
    fn test_rasterized_text_element() {
        let tree = vec![text_layer()];
        let flat = flatten(&tree, None);
        let element = converter(ConvertOptions::default())
            .convert_layer(&flat[0])
            .unwrap()
            .unwrap();

        let image = element.as_image().unwrap();
        assert!(image.metadata.from_text_layer);
        assert!(image.metadata.rasterized);
        assert!(!image.metadata.enhanced);
        assert_eq!(image.metadata.original_text.as_deref(), Some("Caf\u{e9}\nline two"));
        assert_eq!((image.src.width, image.src.height), (100, 40));
    }

    #[test]
    fn test_fill_layer_becomes_shape() {
        let tree = vec![LayerNode::new("fill", Bounds::new(0, 0, 20, 20))
            .with_fill_color(RawColor::new(0.0, 0.0, 255.0))];
        let flat = flatten(&tree, None);
        let element = converter(ConvertOptions::default())
            .convert_layer(&flat[0])
            .unwrap()
            .unwrap();
        assert_eq!(element.kind(), "shape");
        assert_eq!(element.fill.as_deref(), Some("rgb(0,0,255)"));
    }

    #[test]
    fn test_corrupt_raster_gets_placeholder() {
        let tree = vec![LayerNode::new("broken", Bounds::new(0, 0, 8, 8))
            .with_raster(RasterSource::encoded(vec![1, 2, 3]))];
        let flat = flatten(&tree, None);
        let result = converter(ConvertOptions::default()).import_layers(&flat);

        assert_eq!(result.summary.converted, 1);
        assert_eq!(result.summary.placeholders, 1);
        let image = result.elements[0].as_image().unwrap();
        assert!(image.metadata.placeholder);
        assert!(!image.metadata.enhanced);
    }

    #[test]
    fn test_group_is_no_content() {
        let tree = vec![LayerNode::group("group", Vec::new())];
        let flat = flatten(&tree, None);
        let outcome = converter(ConvertOptions::default()).classify(&flat[0]);
        assert_eq!(
            outcome,
            LayerOutcome::Skipped {
                reason: SkipReason::NoContent
            }
        );
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("a\r\nb\rc"), "a\nb\nc");
        assert_eq!(normalize_text("e\u{0301}"), "\u{e9}");
    }
}
