//! Pure Rust raster backend built on the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, GIF, BMP, TIFF, ICO) | `image::ImageReader` with guessed format |
//! | Resize while drawing | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality 1–100) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → BMP | `image::codecs::bmp::BmpEncoder` |
//!
//! Formats without alpha (JPEG, BMP) are flattened to RGB before encoding.
//! Re-encoding an already lossy image is not bit-stable: decoding a JPEG and
//! encoding it again at the same quality produces different bytes.

use super::backend::{DecodeError, EncodeError, RasterBackend};
use super::params::{SurfaceParams, TargetFormat};
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader};
use std::borrow::Cow;
use std::io::Cursor;

/// AV1 encoder speed (1 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw the bitmap onto a surface of the requested size.
///
/// At 1:1 the bitmap is borrowed as-is.
fn draw_surface<'a>(bitmap: &'a DynamicImage, params: &SurfaceParams) -> Cow<'a, DynamicImage> {
    if bitmap.width() == params.width && bitmap.height() == params.height {
        Cow::Borrowed(bitmap)
    } else {
        Cow::Owned(bitmap.resize_exact(params.width, params.height, FilterType::Lanczos3))
    }
}

fn encode_failed(format: TargetFormat, err: impl std::fmt::Display) -> EncodeError {
    EncodeError::Failed {
        format: format.label().to_string(),
        message: err.to_string(),
    }
}

/// Serialize a surface into `format`.
fn serialize_surface(
    surface: &DynamicImage,
    format: TargetFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Vec::new();
    let (width, height) = (surface.width(), surface.height());

    match format {
        TargetFormat::Jpeg => {
            let rgb = surface.to_rgb8();
            image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buffer), quality)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| encode_failed(format, e))?;
        }
        TargetFormat::Png => {
            let rgba = surface.to_rgba8();
            image::codecs::png::PngEncoder::new(Cursor::new(&mut buffer))
                .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| encode_failed(format, e))?;
        }
        TargetFormat::WebP => {
            let rgba = surface.to_rgba8();
            image::codecs::webp::WebPEncoder::new_lossless(Cursor::new(&mut buffer))
                .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| encode_failed(format, e))?;
        }
        TargetFormat::Avif => {
            let rgba = surface.to_rgba8();
            image::codecs::avif::AvifEncoder::new_with_speed_quality(
                Cursor::new(&mut buffer),
                AVIF_SPEED,
                quality,
            )
            .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| encode_failed(format, e))?;
        }
        TargetFormat::Bmp => {
            let rgb = surface.to_rgb8();
            let mut cursor = Cursor::new(&mut buffer);
            image::codecs::bmp::BmpEncoder::new(&mut cursor)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| encode_failed(format, e))?;
        }
    }

    Ok(buffer)
}

impl RasterBackend for RustBackend {
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty {
                name: name.to_string(),
            });
        }
        let corrupt = |e: &dyn std::fmt::Display| DecodeError::Corrupt {
            name: name.to_string(),
            message: e.to_string(),
        };
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| corrupt(&e))?;
        let bitmap = reader.decode().map_err(|e| corrupt(&e))?;
        log::debug!(
            "decoded {} → {}x{}",
            name,
            bitmap.width(),
            bitmap.height()
        );
        Ok(bitmap)
    }

    fn encode(
        &self,
        bitmap: &DynamicImage,
        params: &SurfaceParams,
    ) -> Result<Vec<u8>, EncodeError> {
        if params.width == 0 || params.height == 0 {
            return Err(EncodeError::EmptySurface {
                width: params.width,
                height: params.height,
            });
        }
        let surface = draw_surface(bitmap, params);
        let quality = params.quality.as_percent();
        let bytes = serialize_surface(&surface, params.format, quality)?;
        log::debug!(
            "encoded {}x{} {} (q={}) → {} bytes",
            params.width,
            params.height,
            params.format,
            quality,
            bytes.len()
        );
        Ok(bytes)
    }
}
