//! Glyph drawing tests against a real font.

use std::sync::Arc;

use image::RgbaImage;
use psdport::model::TextContent;
use psdport::raster::{surface, TextRenderSpec};
use psdport::{
    Alignment, ConvertOptions, Element, ElementContent, ExportConverter, FontFamily,
    MemoryFontResolver, RasterSource, Rasterizer,
};

const FONT: &[u8] = include_bytes!("fixtures/DejaVuSans.ttf");

fn fonts() -> Arc<MemoryFontResolver> {
    let mut fonts = MemoryFontResolver::new();
    fonts.register("sans-serif", FONT.to_vec()).unwrap();
    Arc::new(fonts)
}

fn rasterizer() -> Rasterizer {
    Rasterizer::new(ConvertOptions::default().sequential(), fonts())
}

/// Bounding box (min_x, min_y, max_x, max_y) of pixels matching `inked`.
fn ink_box(image: &RgbaImage, inked: impl Fn([u8; 4]) -> bool) -> Option<(u32, u32, u32, u32)> {
    let mut found: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if !inked(pixel.0) {
            continue;
        }
        found = Some(match found {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    found
}

fn render(align: Alignment) -> RgbaImage {
    let spec = TextRenderSpec::new("Hg", FontFamily::parse_css("sans-serif"), 32.0).with_align(align);
    let bitmap = rasterizer().render_text(&spec, 80, 40).unwrap();
    assert_eq!((bitmap.width, bitmap.height), (80, 40));
    surface::decode_bitmap(&bitmap).unwrap()
}

#[test]
fn test_glyphs_land_inside_box() {
    let image = render(Alignment::Left);
    let inked = image.pixels().filter(|p| p.0[3] > 0).count();
    assert!(inked > 100, "only {} inked pixels", inked);

    let (min_x, min_y, _, max_y) = ink_box(&image, |p| p[3] > 0).unwrap();
    assert!(min_x < 6);
    // cap height of "H" above the baseline, descender of "g" below it
    assert!(min_y >= 2 && min_y < 15, "top row {}", min_y);
    assert!(max_y > 30 && max_y < 40, "bottom row {}", max_y);
}

#[test]
fn test_alignment_moves_ink() {
    let (left, _, left_end, _) = ink_box(&render(Alignment::Left), |p| p[3] > 0).unwrap();
    let (center, _, center_end, _) = ink_box(&render(Alignment::Center), |p| p[3] > 0).unwrap();
    let (right, _, right_end, _) = ink_box(&render(Alignment::Right), |p| p[3] > 0).unwrap();

    assert!(left < center && center < right);
    assert!(left_end < center_end && center_end < right_end);
    assert!(right_end >= 74, "right edge {}", right_end);
}

#[test]
fn test_text_color_is_used() {
    let spec = TextRenderSpec::new("H", FontFamily::parse_css("sans-serif"), 32.0)
        .with_color([200, 0, 0, 255]);
    let bitmap = rasterizer().render_text(&spec, 40, 40).unwrap();
    let image = surface::decode_bitmap(&bitmap).unwrap();

    let solid = image.pixels().find(|p| p.0[3] == 255).unwrap();
    assert_eq!(solid.0, [200, 0, 0, 255]);
}

#[test]
fn test_placeholder_is_labelled() {
    let background = ConvertOptions::default().placeholder_color;
    let bitmap = rasterizer().placeholder("missing", 120, 40).unwrap();
    let image = surface::decode_bitmap(&bitmap).unwrap();

    let (min_x, _, max_x, _) = ink_box(&image, |p| p != background).unwrap();
    // label is centered
    assert!(min_x > 20 && max_x < 100, "label spans {}..{}", min_x, max_x);

    let blank = Rasterizer::without_fonts(ConvertOptions::default())
        .placeholder("missing", 120, 40)
        .unwrap();
    let blank = surface::decode_bitmap(&blank).unwrap();
    assert!(ink_box(&blank, |p| p != background).is_none());
}

#[test]
fn test_exported_text_layer_is_drawn() {
    let converter = ExportConverter::new(ConvertOptions::default(), fonts());
    let element = Element::new(ElementContent::Text(TextContent {
        text: "Sale\nToday".to_string(),
        font_family: "Futura, sans-serif".to_string(),
        font_size: 16.0,
        color: "rgb(0,0,0)".to_string(),
        align: Alignment::Center,
        line_height: 1.2,
        letter_spacing: 0.0,
        bold: false,
        italic: false,
        underline: false,
        strikethrough: false,
        metadata: Default::default(),
    }))
    .with_name("banner")
    .with_frame(0.0, 0.0, 100.0, 60.0);

    let layer = converter.convert_element(&element).unwrap();
    let Some(RasterSource::Encoded { data }) = &layer.raster else {
        panic!("expected encoded raster");
    };
    let image = surface::decode_encoded(data).unwrap();
    assert_eq!(image.dimensions(), (100, 60));

    let (_, min_y, _, max_y) = ink_box(&image, |p| p[3] > 0).unwrap();
    // two lines of roughly 19px each
    assert!(min_y < 10);
    assert!(max_y > 20 && max_y < 45, "bottom row {}", max_y);
}
