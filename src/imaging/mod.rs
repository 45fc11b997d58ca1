//! Image re-encoding with the pure-Rust `image` codecs.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Accept** | [`UploadPolicy`]: MIME string or extension, no content sniffing |
//! | **Decode** | `image::ImageReader` with guessed format |
//! | **Draw** | 1:1, or `resize_exact` (Lanczos3) when a resize is requested |
//! | **Encode** | `image` codecs: JPEG, PNG, WebP (lossless), AVIF, BMP |
//!
//! The module is split into:
//! - **Accept**: Upload accept-list checked before any decode
//! - **Calculations**: Pure functions for surface dimensions and size deltas
//! - **Parameters**: Data structures describing the surface to produce
//! - **Backend**: [`RasterBackend`] trait + [`RustBackend`]
//! - **Operations**: The shared decode → draw → re-encode routine

pub mod accept;
pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use accept::UploadPolicy;
pub use backend::{DecodeError, Dimensions, EncodeError, ImagingError, RasterBackend};
pub use calculations::{SizeDelta, calculate_fit_dimensions, calculate_surface_dimensions};
pub use operations::{
    EncodedResult, Reencoded, Reencoder, SourceImage, decode_source, output_name, plan_surface,
    read_source, reencode,
};
pub use params::{EncodingParams, Quality, ResizeMode, SurfaceParams, TargetFormat};
pub use rust_backend::RustBackend;
