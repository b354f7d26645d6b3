//! Integration tests for document import.

use std::sync::Arc;

use psdport::error::{Error, Result};
use psdport::model::{FontSizeSource, RawAlignment, RawColor, StyleRun};
use psdport::{
    to_json, Bounds, DocumentCodec, DocumentTree, JsonFormat, LayerNode, MemoryFontResolver,
    OpacityPolicy, Psdport, RasterSource, TextData,
};

const HEADER: &[u8] = b"8BPS\x00\x01\x00\x00\x00\x00";

/// Mock codec that always decodes the same tree.
struct FixtureCodec {
    build: fn() -> DocumentTree,
}

impl DocumentCodec for FixtureCodec {
    fn decode(&self, _data: &[u8]) -> Result<DocumentTree> {
        Ok((self.build)())
    }

    fn encode(&self, _document: &DocumentTree) -> Result<Vec<u8>> {
        Ok(HEADER.to_vec())
    }
}

fn psdport(build: fn() -> DocumentTree) -> Psdport {
    Psdport::new(Arc::new(FixtureCodec { build }))
        .with_fonts(Arc::new(MemoryFontResolver::new()))
        .sequential()
}

fn text_layer(name: &str, style: StyleRun) -> LayerNode {
    LayerNode::new(name, Bounds::new(0, 0, 200, 40)).with_text(TextData::new(name).with_run(style))
}

fn poster() -> DocumentTree {
    let mut doc = DocumentTree::new(800, 600);
    doc.add_layer(
        LayerNode::new("background", Bounds::new(0, 0, 800, 600))
            .with_raster(RasterSource::solid(800, 600, [240, 240, 240, 255])),
    );
    doc.add_layer(LayerNode::new("draft", Bounds::new(0, 0, 50, 50)).hidden());
    doc.add_layer(LayerNode::group(
        "content",
        vec![
            text_layer("Headline", StyleRun::new().with_font("Arial").with_size_pt(24.0)),
            LayerNode::new("badge", Bounds::new(700, 20, 780, 60))
                .with_fill_color(RawColor::new(0.0, 0.5, 1.0))
                .with_blend_mode("multiply"),
        ],
    ));
    doc
}

#[test]
fn test_import_poster_summary() {
    let imported = psdport(poster).import_bytes(HEADER).unwrap();

    assert_eq!(imported.page.dimensions(), (800, 600));
    assert_eq!(imported.summary.total, 5);
    assert_eq!(imported.summary.converted, 3);
    // hidden "draft" and the "content" group
    assert_eq!(imported.summary.skipped, 2);
    assert_eq!(imported.summary.failed, 0);
    assert_eq!(imported.summary.rasterized_text, 1);

    let names: Vec<_> = imported.page.elements.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["background", "Headline", "badge"]);
}

#[test]
fn test_hidden_layer_is_skipped_not_failed() {
    fn only_hidden() -> DocumentTree {
        let mut doc = DocumentTree::new(10, 10);
        doc.add_layer(
            LayerNode::new("ghost", Bounds::new(0, 0, 10, 10))
                .with_raster(RasterSource::solid(10, 10, [0, 0, 0, 255]))
                .hidden(),
        );
        doc
    }

    let imported = psdport(only_hidden).import_bytes(HEADER).unwrap();
    assert!(imported.page.is_empty());
    assert_eq!(imported.summary.skipped, 1);
    assert!(imported.summary.is_clean());
}

#[test]
fn test_opacity_forced_opaque_by_default() {
    fn translucent() -> DocumentTree {
        let mut doc = DocumentTree::new(10, 10);
        for opacity in [0u8, 128, 255] {
            doc.add_layer(
                LayerNode::new(format!("o{}", opacity), Bounds::new(0, 0, 4, 4))
                    .with_fill_color(RawColor::new(255.0, 0.0, 0.0))
                    .with_opacity(opacity),
            );
        }
        doc
    }

    let imported = psdport(translucent).import_bytes(HEADER).unwrap();
    let opacities: Vec<_> = imported.page.elements.iter().map(|e| e.opacity).collect();
    assert_eq!(opacities, vec![1.0, 1.0, 1.0]);

    let preserved = psdport(translucent)
        .with_opacity_policy(OpacityPolicy::Preserve)
        .import_bytes(HEADER)
        .unwrap();
    let opacities: Vec<_> = preserved.page.elements.iter().map(|e| e.opacity).collect();
    assert_eq!(opacities[0], 0.0);
    assert!((opacities[1] - 128.0 / 255.0).abs() < 1e-9);
    assert_eq!(opacities[2], 1.0);
}

#[test]
fn test_shape_fill_and_blend() {
    let imported = psdport(poster).import_bytes(HEADER).unwrap();
    let badge = &imported.page.elements[2];

    assert_eq!(badge.kind(), "shape");
    assert_eq!(badge.fill.as_deref(), Some("rgb(0,128,255)"));
    assert_eq!(badge.blend_mode.as_str(), "multiply");
    assert_eq!((badge.x, badge.y, badge.width, badge.height), (700.0, 20.0, 80.0, 40.0));
}

#[test]
fn test_enhanced_background_is_larger_than_frame() {
    let imported = psdport(poster).import_bytes(HEADER).unwrap();
    let background = imported.page.elements[0].as_image().unwrap();

    assert!(background.metadata.enhanced);
    assert_eq!((background.src.width, background.src.height), (1600, 1200));
    assert_eq!(background.metadata.source_width, Some(800));
    assert_eq!(imported.page.elements[0].width, 800.0);
}

#[test]
fn test_editable_text_alignment_table() {
    fn aligned() -> DocumentTree {
        let mut doc = DocumentTree::new(400, 400);
        let cases = vec![
            RawAlignment::Code(0),
            RawAlignment::Code(1),
            RawAlignment::Code(2),
            RawAlignment::Code(3),
            RawAlignment::from("right"),
            RawAlignment::Code(9),
            RawAlignment::from("diagonal"),
        ];
        for (i, alignment) in cases.into_iter().enumerate() {
            doc.add_layer(text_layer(
                &format!("t{}", i),
                StyleRun::new().with_alignment(alignment),
            ));
        }
        doc
    }

    let imported = psdport(aligned).editable_text().import_bytes(HEADER).unwrap();
    let aligns: Vec<_> = imported
        .page
        .elements
        .iter()
        .map(|e| e.as_text().unwrap().align.as_str())
        .collect();
    assert_eq!(
        aligns,
        vec!["left", "center", "right", "justify", "right", "left", "left"]
    );
}

#[test]
fn test_editable_text_scale_guard() {
    fn scaled() -> DocumentTree {
        let mut doc = DocumentTree::new(400, 400);
        let mut implied = StyleRun::new().with_size_pt(18.0).with_implied_size(24.0);
        implied.vertical_scale = Some(200.0);
        doc.add_layer(text_layer("implied", implied));

        let mut derived = StyleRun::new().with_size_pt(12.0);
        derived.vertical_scale = Some(200.0);
        derived.tracking = Some(100);
        derived.horizontal_scale = Some(50.0);
        doc.add_layer(text_layer("derived", derived));
        doc
    }

    let imported = psdport(scaled).editable_text().import_bytes(HEADER).unwrap();

    let implied = imported.page.elements[0].as_text().unwrap();
    assert_eq!(implied.font_size, 24.0);
    assert_eq!(implied.metadata.font_size_source, FontSizeSource::Implied);
    assert!(!implied.metadata.scale_applied);
    assert_eq!(implied.metadata.scale_y, 2.0);

    let derived = imported.page.elements[1].as_text().unwrap();
    assert!((derived.font_size - 32.0).abs() < 1e-9);
    assert!((derived.letter_spacing - 0.05).abs() < 1e-9);
    assert!(derived.metadata.scale_applied);
    assert_eq!(derived.metadata.original_font_size_pt, Some(12.0));
}

#[test]
fn test_editable_text_defaults() {
    fn bare() -> DocumentTree {
        let mut doc = DocumentTree::new(100, 100);
        doc.add_layer(
            LayerNode::new("plain", Bounds::new(0, 0, 100, 20)).with_text(TextData::new("hi")),
        );
        doc
    }

    let imported = psdport(bare).editable_text().import_bytes(HEADER).unwrap();
    let text = imported.page.elements[0].as_text().unwrap();

    assert!((text.font_size - 16.0).abs() < 1e-9);
    assert_eq!(text.color, "rgb(0,0,0)");
    assert_eq!(text.line_height, 1.2);
    assert_eq!(text.letter_spacing, 0.0);
    assert!(!text.bold);
    assert!(!text.italic);
}

#[test]
fn test_malformed_font_size_fails_layer() {
    fn broken() -> DocumentTree {
        let mut doc = DocumentTree::new(100, 100);
        doc.add_layer(text_layer("nan", StyleRun::new().with_size_pt(f64::NAN)));
        doc.add_layer(text_layer("negative", StyleRun::new().with_size_pt(-12.0)));
        doc.add_layer(text_layer("fine", StyleRun::new().with_size_pt(12.0)));
        doc
    }

    for builder in [psdport(broken).editable_text(), psdport(broken)] {
        let imported = builder.import_bytes(HEADER).unwrap();
        assert_eq!(imported.summary.converted, 1);
        assert_eq!(imported.summary.failed, 2);
        assert_eq!(imported.page.elements.len(), 1);
        assert_eq!(imported.page.elements[0].name, "fine");
    }

    let imported = psdport(broken).editable_text().import_bytes(HEADER).unwrap();
    let json = to_json(&imported.page, JsonFormat::Compact).unwrap();
    let page: psdport::Page = serde_json::from_str(&json).unwrap();
    assert_eq!(page.elements[0].as_text().unwrap().font_size, 16.0);
}

#[test]
fn test_import_rejects_bad_magic() {
    let result = psdport(poster).import_bytes(b"GIF89a....");
    assert!(matches!(result, Err(Error::MalformedInput)));
}

#[test]
fn test_import_file_names_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summer-sale.psd");
    std::fs::write(&path, HEADER).unwrap();

    let imported = psdport(poster).import_file(&path).unwrap();
    assert_eq!(imported.page.name, "summer-sale");
}

#[test]
fn test_import_missing_file() {
    let result = psdport(poster).import_file("/nonexistent/poster.psd");
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_page_json_shape() {
    let imported = psdport(poster).editable_text().import_bytes(HEADER).unwrap();
    let json = to_json(&imported.page, JsonFormat::Compact).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["width"], 800);
    let elements = value["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 3);
    assert_eq!(elements[0]["type"], "image");
    assert_eq!(elements[1]["type"], "text");
    assert_eq!(elements[1]["text"], "Headline");
    assert_eq!(elements[2]["type"], "shape");
    assert_eq!(elements[2]["blend_mode"], "multiply");
}
