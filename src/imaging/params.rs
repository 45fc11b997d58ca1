//! Parameter types for the re-encode pipeline.
//!
//! These structs describe *what* to produce, not *how*. They are the
//! interface between [`operations`](super::operations) (which plans the
//! off-screen surface) and the [`backend`](super::backend) (which does the
//! pixel work), so a mock backend can stand in during tests.
//!
//! ## Types
//!
//! - [`TargetFormat`] — Output container. JPEG and AVIF are lossy; PNG, WebP and BMP are lossless.
//! - [`Quality`] — Lossy encoding quality in `[0, 1]`, default 0.92. Clamped on construction.
//! - [`ResizeMode`] — Optional resize applied while drawing the surface.
//! - [`EncodingParams`] — Format + quality + optional resize, as set by the tool's controls.
//! - [`SurfaceParams`] — Fully resolved surface: exact pixel size, format, quality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format for a re-encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpeg,
    Png,
    #[serde(rename = "webp")]
    WebP,
    Avif,
    Bmp,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 5] = [
        TargetFormat::Jpeg,
        TargetFormat::Png,
        TargetFormat::WebP,
        TargetFormat::Avif,
        TargetFormat::Bmp,
    ];

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Avif => "image/avif",
            Self::Bmp => "image/bmp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Avif => "avif",
            Self::Bmp => "bmp",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::WebP => "WebP",
            Self::Avif => "AVIF",
            Self::Bmp => "BMP",
        }
    }

    /// Whether the quality factor affects the encoder.
    ///
    /// The WebP encoder compiled in is lossless-only, so WebP ignores quality
    /// just like PNG and BMP.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg | Self::Avif)
    }

    /// Whether the container can carry an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, Self::Jpeg | Self::Bmp)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "jpg" | "jpeg" | "image/jpeg" => Ok(Self::Jpeg),
            "png" | "image/png" => Ok(Self::Png),
            "webp" | "image/webp" => Ok(Self::WebP),
            "avif" | "image/avif" => Ok(Self::Avif),
            "bmp" | "image/bmp" => Ok(Self::Bmp),
            other => Err(format!(
                "unsupported output format: {other} (expected jpeg, png, webp, avif or bmp)"
            )),
        }
    }
}

/// Lossy encoding quality in `[0, 1]`, the range a browser's canvas encoder takes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f32);

impl Quality {
    pub const DEFAULT: f32 = 0.92;

    /// Clamp into `[0, 1]`. NaN falls back to the default.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1–100 scale the `image` encoders expect.
    pub fn as_percent(self) -> u8 {
        ((self.0 * 100.0).round() as u8).clamp(1, 100)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Resize applied while drawing onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Fit inside the box, preserving aspect ratio. Never upscales.
    Fit { max_width: u32, max_height: u32 },
    /// Stretch to exactly these dimensions.
    Exact { width: u32, height: u32 },
}

/// What the tool's controls ask for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodingParams {
    pub target_format: TargetFormat,
    pub quality: Quality,
    pub resize: Option<ResizeMode>,
}

impl EncodingParams {
    pub fn new(target_format: TargetFormat, quality: Quality) -> Self {
        Self {
            target_format,
            quality,
            resize: None,
        }
    }

    pub fn with_resize(mut self, resize: ResizeMode) -> Self {
        self.resize = Some(resize);
        self
    }
}

impl Default for EncodingParams {
    fn default() -> Self {
        Self::new(TargetFormat::Jpeg, Quality::default())
    }
}

/// Fully resolved off-screen surface handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceParams {
    pub width: u32,
    pub height: u32,
    pub format: TargetFormat,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_unit_range() {
        assert_eq!(Quality::new(-0.5).value(), 0.0);
        assert_eq!(Quality::new(0.5).value(), 0.5);
        assert_eq!(Quality::new(1.5).value(), 1.0);
    }

    #[test]
    fn quality_nan_is_default() {
        assert_eq!(Quality::new(f32::NAN), Quality::default());
    }

    #[test]
    fn quality_default_is_092() {
        assert_eq!(Quality::default().value(), 0.92);
        assert_eq!(Quality::default().as_percent(), 92);
    }

    #[test]
    fn quality_percent_never_zero() {
        assert_eq!(Quality::new(0.0).as_percent(), 1);
        assert_eq!(Quality::new(1.0).as_percent(), 100);
        assert_eq!(Quality::new(0.8).as_percent(), 80);
    }

    #[test]
    fn format_parses_extensions_and_mime_types() {
        assert_eq!("jpg".parse::<TargetFormat>(), Ok(TargetFormat::Jpeg));
        assert_eq!(".JPEG".parse::<TargetFormat>(), Ok(TargetFormat::Jpeg));
        assert_eq!("image/webp".parse::<TargetFormat>(), Ok(TargetFormat::WebP));
        assert_eq!(" avif ".parse::<TargetFormat>(), Ok(TargetFormat::Avif));
        assert!("tiff".parse::<TargetFormat>().is_err());
    }

    #[test]
    fn lossy_and_alpha_flags() {
        assert!(TargetFormat::Jpeg.is_lossy());
        assert!(TargetFormat::Avif.is_lossy());
        assert!(!TargetFormat::Png.is_lossy());
        assert!(!TargetFormat::WebP.is_lossy());
        assert!(!TargetFormat::Jpeg.supports_alpha());
        assert!(!TargetFormat::Bmp.supports_alpha());
        assert!(TargetFormat::Png.supports_alpha());
    }

    #[test]
    fn format_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: TargetFormat,
        }
        let w: Wrapper = toml::from_str("format = \"webp\"").unwrap();
        assert_eq!(w.format, TargetFormat::WebP);
        let w: Wrapper = toml::from_str("format = \"jpeg\"").unwrap();
        assert_eq!(w.format, TargetFormat::Jpeg);
    }
}
