//! Shared test utilities: synthetic bitmaps and their encoded bytes.
//!
//! Tests never ship fixture images; everything is generated in memory so the
//! exact pixel content is known.

use image::{DynamicImage, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};

// =========================================================================
// Bitmaps
// =========================================================================

/// RGB gradient with some high-frequency detail, so lossy quality matters.
pub fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let noise = ((x * 7 + y * 13) % 32) as u8;
        Rgb([(x % 256) as u8, (y % 256) as u8, 128u8.wrapping_add(noise)])
    }))
}

/// Half-transparent RGBA checkerboard.
pub fn translucent_rgba(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            Rgba([255, 0, 0, 128])
        } else {
            Rgba([0, 0, 255, 255])
        }
    }))
}

// =========================================================================
// Encoded bytes
// =========================================================================

/// Encode a bitmap as PNG.
pub fn encode_png(bitmap: &DynamicImage) -> Vec<u8> {
    let rgba = bitmap.to_rgba8();
    let mut bytes = Vec::new();
    image::codecs::png::PngEncoder::new(&mut bytes)
        .write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
    bytes
}

/// Encode a bitmap as JPEG at the given 1–100 quality.
pub fn encode_jpeg(bitmap: &DynamicImage, quality: u8) -> Vec<u8> {
    let rgb = bitmap.to_rgb8();
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    bytes
}
