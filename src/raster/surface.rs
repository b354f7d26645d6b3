//! Pixel surfaces: decoding, resampling, sharpening and PNG output.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use rayon::prelude::*;
use tiny_skia::Pixmap;

use crate::error::{Error, Result};
use crate::model::{Bitmap, RasterSource};

/// 3x3 sharpening kernel, row-major.
pub const SHARPEN_KERNEL: [[i32; 3]; 3] = [[0, -1, 0], [-1, 5, -1], [0, -1, 0]];

/// Decode a layer raster into straight-alpha RGBA.
pub fn decode_source(source: &RasterSource) -> Result<RgbaImage> {
    match source {
        RasterSource::Pixels {
            width,
            height,
            rgba,
        } => {
            let expected = *width as usize * *height as usize * 4;
            if rgba.len() != expected {
                return Err(Error::Raster(format!(
                    "pixel buffer holds {} bytes, {}x{} needs {}",
                    rgba.len(),
                    width,
                    height,
                    expected
                )));
            }
            RgbaImage::from_raw(*width, *height, rgba.clone())
                .ok_or_else(|| Error::Raster("invalid pixel buffer".into()))
        }
        RasterSource::Encoded { data } => decode_encoded(data),
    }
}

/// Pixel size of a layer raster without decoding its pixels.
pub fn source_dimensions(source: &RasterSource) -> Option<(u32, u32)> {
    match source {
        RasterSource::Pixels { width, height, .. } => Some((*width, *height)),
        RasterSource::Encoded { data } => image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok(),
    }
}

/// Decode PNG, JPEG or BMP bytes.
pub fn decode_encoded(data: &[u8]) -> Result<RgbaImage> {
    let decoded = image::load_from_memory(data)?;
    Ok(decoded.to_rgba8())
}

/// Decode the bytes held by a bitmap.
pub fn decode_bitmap(bitmap: &Bitmap) -> Result<RgbaImage> {
    decode_encoded(&bitmap.data)
}

/// Resample to exactly `width` x `height`.
pub fn fit_to_box(image: RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (width, height) = (width.max(1), height.max(1));
    if image.dimensions() == (width, height) {
        return image;
    }
    imageops::resize(&image, width, height, FilterType::Triangle)
}

/// Upscale by an integer factor.
pub fn upscale(image: &RgbaImage, factor: u32) -> RgbaImage {
    if factor <= 1 {
        return image.clone();
    }
    let (w, h) = image.dimensions();
    imageops::resize(
        image,
        w.saturating_mul(factor),
        h.saturating_mul(factor),
        FilterType::CatmullRom,
    )
}

/// Apply [`SHARPEN_KERNEL`] to the color channels.
///
/// Alpha is copied unchanged and edge pixels sample their nearest neighbor
/// inside the image. With `parallel` the rows are split across the rayon pool;
/// the result is the same either way.
pub fn sharpen(image: &RgbaImage, parallel: bool) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    if width == 0 || height == 0 {
        return out;
    }

    let src: &[u8] = image.as_raw();
    let stride = width as usize * 4;
    let (w, h) = (width as i64, height as i64);

    let sample = |x: i64, y: i64, c: usize| -> i32 {
        let x = x.clamp(0, w - 1) as usize;
        let y = y.clamp(0, h - 1) as usize;
        src[y * stride + x * 4 + c] as i32
    };

    let process_row = |(y, row): (usize, &mut [u8])| {
        let y = y as i64;
        for x in 0..w {
            let offset = x as usize * 4;
            for c in 0..3 {
                let mut acc = 0i32;
                for (ky, kernel_row) in SHARPEN_KERNEL.iter().enumerate() {
                    for (kx, weight) in kernel_row.iter().enumerate() {
                        if *weight != 0 {
                            acc += weight * sample(x + kx as i64 - 1, y + ky as i64 - 1, c);
                        }
                    }
                }
                row[offset + c] = acc.clamp(0, 255) as u8;
            }
        }
    };

    let dst: &mut [u8] = &mut out;
    if parallel {
        dst.par_chunks_mut(stride).enumerate().for_each(process_row);
    } else {
        dst.chunks_mut(stride).enumerate().for_each(process_row);
    }
    out
}

/// Encode as a PNG bitmap.
pub fn encode_png(image: &RgbaImage) -> Result<Bitmap> {
    let mut data = Vec::new();
    image.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)?;
    let (width, height) = image.dimensions();
    Ok(Bitmap::png(width, height, data))
}

/// A straight-alpha image filled with one color.
pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width.max(1), height.max(1), image::Rgba(rgba))
}

/// Blank drawing surface.
pub fn new_pixmap(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| Error::Raster(format!("cannot allocate {}x{} surface", width, height)))
}

/// Copy a straight-alpha image onto a drawing surface.
pub fn pixmap_from_rgba(image: &RgbaImage) -> Result<Pixmap> {
    let (width, height) = image.dimensions();
    let mut pixmap = new_pixmap(width, height)?;
    for (src, dst) in image
        .as_raw()
        .chunks_exact(4)
        .zip(pixmap.data_mut().chunks_exact_mut(4))
    {
        let a = src[3];
        dst[0] = premul_u8(src[0], a);
        dst[1] = premul_u8(src[1], a);
        dst[2] = premul_u8(src[2], a);
        dst[3] = a;
    }
    Ok(pixmap)
}

/// Read a drawing surface back as straight-alpha RGBA.
pub fn rgba_from_pixmap(pixmap: &Pixmap) -> Result<RgbaImage> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        data.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| Error::Raster("surface size mismatch".into()))
}

fn premul_u8(channel: u8, alpha: u8) -> u8 {
    let prod = (channel as u16) * (alpha as u16) + 127;
    ((prod + (prod >> 8)) >> 8) as u8
}

/// Parse a CSS color (`#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`,
/// `transparent` and a few names).
pub fn parse_css_color(value: &str) -> Option<[u8; 4]> {
    let value = value.trim().to_ascii_lowercase();

    if let Some(hex) = value.strip_prefix('#') {
        let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return match hex.len() {
            3 => Some([digit(0)? * 17, digit(1)? * 17, digit(2)? * 17, 255]),
            6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
            8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
            _ => None,
        };
    }

    if let Some(args) = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<f64> = args
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .ok()?;
        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        return match parts.as_slice() {
            [r, g, b] => Some([channel(*r), channel(*g), channel(*b), 255]),
            [r, g, b, a] => Some([
                channel(*r),
                channel(*g),
                channel(*b),
                channel(a.clamp(0.0, 1.0) * 255.0),
            ]),
            _ => None,
        };
    }

    match value.as_str() {
        "transparent" => Some([0, 0, 0, 0]),
        "black" => Some([0, 0, 0, 255]),
        "white" => Some([255, 255, 255, 255]),
        "red" => Some([255, 0, 0, 255]),
        "green" => Some([0, 128, 0, 255]),
        "blue" => Some([0, 0, 255, 255]),
        "gray" | "grey" => Some([128, 128, 128, 255]),
        _ => None,
    }
}
