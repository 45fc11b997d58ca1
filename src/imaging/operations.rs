//! High-level re-encode operations.
//!
//! One shared decode → draw → re-encode routine serves every image tool
//! (compress, convert, resize). The functions take parameters, plan the
//! off-screen surface with pure calculations, and call the backend.
//!
//! The result is a pure function of `(SourceImage, EncodingParams)`: nothing
//! is cached, so changing a control simply means calling [`reencode`] again.

use super::accept::UploadPolicy;
use super::backend::{DecodeError, Dimensions, EncodeError, ImagingError, RasterBackend};
use super::calculations::{SizeDelta, calculate_surface_dimensions};
use super::params::{EncodingParams, SurfaceParams, TargetFormat};
use crate::data_uri::{DataUri, DataUriError};
use image::DynamicImage;
use std::path::Path;

/// A decoded user file, owned by the tool invocation that loaded it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    name: String,
    bitmap: DynamicImage,
    byte_size: u64,
}

impl SourceImage {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the original file in bytes.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Natural dimensions of the decoded bitmap.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.bitmap.width(),
            height: self.bitmap.height(),
        }
    }

    pub fn bitmap(&self) -> &DynamicImage {
        &self.bitmap
    }
}

/// Check the accept-list, then decode.
///
/// The policy sees only `name` and `declared_mime`; a rejected file is never
/// handed to the decoder.
pub fn decode_source(
    backend: &impl RasterBackend,
    policy: &UploadPolicy,
    name: &str,
    declared_mime: Option<&str>,
    bytes: &[u8],
) -> Result<SourceImage, DecodeError> {
    policy.check(name, declared_mime, bytes.len() as u64)?;
    let bitmap = backend.decode(name, bytes)?;
    Ok(SourceImage {
        name: name.to_string(),
        bitmap,
        byte_size: bytes.len() as u64,
    })
}

/// Read a file from disk and decode it.
///
/// Type and size are checked from the file name and metadata before the
/// contents are read.
pub fn read_source(
    backend: &impl RasterBackend,
    policy: &UploadPolicy,
    path: &Path,
    declared_mime: Option<&str>,
) -> Result<SourceImage, DecodeError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let size = std::fs::metadata(path)?.len();
    policy.check(&name, declared_mime, size)?;
    let bytes = std::fs::read(path)?;
    decode_source(backend, policy, &name, declared_mime, &bytes)
}

/// Plan the off-screen surface without drawing anything.
pub fn plan_surface(source: Dimensions, params: &EncodingParams) -> SurfaceParams {
    let (width, height) =
        calculate_surface_dimensions((source.width, source.height), params.resize);
    SurfaceParams {
        width,
        height,
        format: params.target_format,
        quality: params.quality,
    }
}

/// The serialized surface.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedResult {
    pub data_uri: DataUri,
    /// Derived from the base64 payload length.
    pub byte_size: u64,
    pub format: TargetFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedResult {
    /// Raw encoded bytes, for writing the download to disk.
    pub fn bytes(&self) -> Result<Vec<u8>, DataUriError> {
        self.data_uri.decode()
    }

    pub fn size_delta(&self, original: u64) -> SizeDelta {
        SizeDelta::new(original, self.byte_size)
    }
}

/// Draw the source onto a planned surface and serialize it.
pub fn reencode(
    backend: &impl RasterBackend,
    source: &SourceImage,
    params: &EncodingParams,
) -> Result<EncodedResult, EncodeError> {
    let surface = plan_surface(source.dimensions(), params);
    let bytes = backend.encode(&source.bitmap, &surface)?;
    let data_uri = DataUri::encode(surface.format.mime(), &bytes);
    let byte_size = data_uri.byte_size();
    log::info!(
        "{}: {}x{} → {}x{} {} ({} → {} bytes)",
        source.name,
        source.bitmap.width(),
        source.bitmap.height(),
        surface.width,
        surface.height,
        surface.format,
        source.byte_size,
        byte_size
    );
    Ok(EncodedResult {
        data_uri,
        byte_size,
        format: surface.format,
        width: surface.width,
        height: surface.height,
    })
}

/// Download name for a re-encoded file: source stem + target extension.
pub fn output_name(source_name: &str, format: TargetFormat) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("image");
    let safe_stem: String = stem
        .chars()
        .map(|ch| if ch == '/' || ch == '\\' { '_' } else { ch })
        .collect();
    format!("{}.{}", safe_stem, format.extension())
}

/// Everything a tool shows after one run.
#[derive(Debug, Clone)]
pub struct Reencoded {
    pub source_name: String,
    pub source_size: u64,
    pub source_dimensions: Dimensions,
    pub output_name: String,
    pub result: EncodedResult,
}

impl Reencoded {
    pub fn size_delta(&self) -> SizeDelta {
        self.result.size_delta(self.source_size)
    }
}

/// Builder over the shared pipeline: `{file, format, quality}` → `{data URI, size}`.
///
/// ```no_run
/// # use dp_tools::imaging::{Reencoder, RustBackend, EncodingParams, TargetFormat, Quality};
/// let backend = RustBackend::new();
/// let out = Reencoder::new(&backend)
///     .params(EncodingParams::new(TargetFormat::Jpeg, Quality::new(0.7)))
///     .run_file("photo.png".as_ref())?;
/// println!("{} bytes", out.result.byte_size);
/// # Ok::<(), dp_tools::imaging::ImagingError>(())
/// ```
pub struct Reencoder<'a, B: RasterBackend> {
    backend: &'a B,
    policy: UploadPolicy,
    params: EncodingParams,
}

impl<'a, B: RasterBackend> Reencoder<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            policy: UploadPolicy::images(),
            params: EncodingParams::default(),
        }
    }

    pub fn policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn params(mut self, params: EncodingParams) -> Self {
        self.params = params;
        self
    }

    /// Run on in-memory bytes.
    pub fn run_bytes(
        &self,
        name: &str,
        declared_mime: Option<&str>,
        bytes: &[u8],
    ) -> Result<Reencoded, ImagingError> {
        let source = decode_source(self.backend, &self.policy, name, declared_mime, bytes)?;
        self.finish(&source)
    }

    /// Run on a file from disk.
    pub fn run_file(&self, path: &Path) -> Result<Reencoded, ImagingError> {
        let source = read_source(self.backend, &self.policy, path, None)?;
        self.finish(&source)
    }

    /// Re-run on an already decoded source, e.g. after a control changed.
    pub fn run_source(&self, source: &SourceImage) -> Result<Reencoded, ImagingError> {
        self.finish(source)
    }

    fn finish(&self, source: &SourceImage) -> Result<Reencoded, ImagingError> {
        let result = reencode(self.backend, source, &self.params)?;
        Ok(Reencoded {
            source_name: source.name.clone(),
            source_size: source.byte_size,
            source_dimensions: source.dimensions(),
            output_name: output_name(&source.name, result.format),
            result,
        })
    }
}
