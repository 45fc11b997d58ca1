//! Raster backend trait and the pipeline's error types.
//!
//! The [`RasterBackend`] trait defines the two primitives every tool needs:
//! decode a byte buffer into a bitmap, and serialize a bitmap drawn onto an
//! off-screen surface. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate's pure-Rust codecs.

use super::params::SurfaceParams;
use image::DynamicImage;
use thiserror::Error;

/// Failure while accepting or decoding a user-supplied file.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{name}: unsupported file type ({reason})")]
    UnsupportedType { name: String, reason: String },
    #[error("{name}: file is {size} bytes, limit is {limit}")]
    TooLarge { name: String, size: u64, limit: u64 },
    #[error("{name}: file is empty")]
    Empty { name: String },
    #[error("Failed to decode {name}: {message}")]
    Corrupt { name: String, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while drawing or serializing the off-screen surface.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Cannot create a {width}x{height} surface")]
    EmptySurface { width: u32, height: u32 },
    #[error("{format} encode failed: {message}")]
    Failed { format: String, message: String },
}

/// Either half of the decode → re-encode pipeline.
#[derive(Error, Debug)]
pub enum ImagingError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Natural dimensions of a decoded bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for raster backends.
///
/// `Sync` so one backend can serve a rayon batch.
pub trait RasterBackend: Sync {
    /// Decode bytes into a bitmap. `name` only labels errors.
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DynamicImage, DecodeError>;

    /// Draw the bitmap onto a surface of `params.width x params.height` and
    /// serialize it in `params.format`.
    fn encode(&self, bitmap: &DynamicImage, params: &SurfaceParams)
    -> Result<Vec<u8>, EncodeError>;
}
