//! Tool configuration module.
//!
//! Handles loading, validating, and merging `dp-tools.toml`. Stock defaults
//! are overridden by a user file in the working directory (or the directory
//! given with `--config`).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [reencode]
//! format = "jpeg"           # jpeg | png | webp | avif | bmp
//! quality = 0.92            # 0.0 - 1.0, used by lossy formats only
//!
//! [upload]
//! mime_types = ["image/*"]  # Declared MIME types accepted by image tools
//! extensions = ["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff", "ico"]
//! # max_bytes = 10485760    # Omit for no size limit
//!
//! [service]
//! endpoint = "http://localhost:3400/api/flows"
//! # timeout_secs = 60       # Omit to wait indefinitely
//!
//! [processing]
//! # max_threads = 4         # Omit for auto = CPU cores
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse, so override just the values you want:
//!
//! ```toml
//! [reencode]
//! format = "webp"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{EncodingParams, Quality, TargetFormat, UploadPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the config directory.
pub const CONFIG_FILE_NAME: &str = "dp-tools.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `dp-tools.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Default re-encode target.
    pub reencode: ReencodeConfig,
    /// Accept-list for image uploads.
    pub upload: UploadConfig,
    /// Remote conversion service.
    pub service: ServiceConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ToolsConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.reencode.quality) {
            return Err(ConfigError::Validation(
                "reencode.quality must be 0.0-1.0".into(),
            ));
        }
        if self.upload.mime_types.is_empty() && self.upload.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "upload needs at least one mime type or extension".into(),
            ));
        }
        if self.upload.max_bytes == Some(0) {
            return Err(ConfigError::Validation(
                "upload.max_bytes must be non-zero (omit it for no limit)".into(),
            ));
        }
        let endpoint = self.service.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "service.endpoint must be an http(s) URL".into(),
            ));
        }
        if self.service.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "service.timeout_secs must be non-zero (omit it for no timeout)".into(),
            ));
        }
        Ok(())
    }
}

/// Default target of the re-encode tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReencodeConfig {
    pub format: TargetFormat,
    /// Lossy encoding quality (0.0 = worst, 1.0 = best).
    pub quality: f32,
}

impl Default for ReencodeConfig {
    fn default() -> Self {
        Self {
            format: TargetFormat::Jpeg,
            quality: Quality::DEFAULT,
        }
    }
}

impl ReencodeConfig {
    pub fn params(&self) -> EncodingParams {
        EncodingParams::new(self.format, Quality::new(self.quality))
    }
}

/// Upload accept-list settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub mime_types: Vec<String>,
    pub extensions: Vec<String>,
    /// When absent, files of any size are decoded.
    pub max_bytes: Option<u64>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        let images = UploadPolicy::images();
        Self {
            mime_types: images.mime_types,
            extensions: images.extensions,
            max_bytes: None,
        }
    }
}

impl UploadConfig {
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy {
            mime_types: self.mime_types.clone(),
            extensions: self
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            max_bytes: self.max_bytes,
        }
    }
}

/// Remote conversion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Base URL; the flow's operation name is appended.
    pub endpoint: String,
    /// Request timeout. When absent, requests wait indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3400/api/flows".to_string(),
            timeout_secs: None,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel re-encode workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_threads
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Base layer for merging user overrides on top. `None` fields are simply
/// absent from the table.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ToolsConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `dp-tools.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ToolsConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolsConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `dp-tools.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<ToolsConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    let config = resolve_config(base, overlay)?;
    log::debug!("config resolved from {}", dir.display());
    Ok(config)
}

/// Returns a fully-commented stock `dp-tools.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# DP Tools Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# The file is read from the working directory, or from the directory
# passed with --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Image re-encode
# ---------------------------------------------------------------------------
[reencode]
# Target format: jpeg, png, webp, avif or bmp.
format = "jpeg"

# Encoding quality from 0.0 (worst) to 1.0 (best).
# Used by JPEG and AVIF; PNG, WebP and BMP are lossless and ignore it.
quality = 0.92

# ---------------------------------------------------------------------------
# Upload accept-list
# ---------------------------------------------------------------------------
[upload]
# A file is accepted when its declared MIME type OR its extension matches.
# File content is never sniffed.
mime_types = ["image/*"]
extensions = ["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff", "ico"]

# Largest accepted file in bytes. Omit for no limit.
# max_bytes = 10485760

# ---------------------------------------------------------------------------
# Remote conversion service
# ---------------------------------------------------------------------------
[service]
# Base URL. Each flow POSTs to <endpoint>/<operation>.
endpoint = "http://localhost:3400/api/flows"

# Request timeout in seconds. Omit to wait indefinitely.
# timeout_secs = 60

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel re-encode workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = ToolsConfig::default();
        assert_eq!(config.reencode.format, TargetFormat::Jpeg);
        assert!((config.reencode.quality - 0.92).abs() < 1e-6);
        assert_eq!(config.upload.mime_types, vec!["image/*"]);
        assert!(config.upload.extensions.contains(&"png".to_string()));
        assert_eq!(config.upload.max_bytes, None);
        assert_eq!(config.service.endpoint, "http://localhost:3400/api/flows");
        assert_eq!(config.service.timeout_secs, None);
        assert_eq!(config.processing.max_threads, None);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[reencode]
format = "webp"
"#;
        let config: ToolsConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.reencode.format, TargetFormat::WebP);
        // Default values preserved
        assert!((config.reencode.quality - 0.92).abs() < 1e-6);
        assert_eq!(config.upload.mime_types, vec!["image/*"]);
    }

    #[test]
    fn reencode_config_builds_params() {
        let config = ReencodeConfig {
            format: TargetFormat::Avif,
            quality: 0.5,
        };
        let params = config.params();
        assert_eq!(params.target_format, TargetFormat::Avif);
        assert_eq!(params.quality, Quality::new(0.5));
        assert!(params.resize.is_none());
    }

    #[test]
    fn upload_config_policy_normalizes_extensions() {
        let config = UploadConfig {
            mime_types: vec![],
            extensions: vec![".PNG".into()],
            max_bytes: Some(5),
        };
        let policy = config.policy();
        assert_eq!(policy.extensions, vec!["png"]);
        assert!(policy.check("a.png", None, 5).is_ok());
        assert!(policy.check("a.png", None, 6).is_err());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.reencode.format, TargetFormat::Jpeg);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
[service]
endpoint = "https://flows.example.com/api"
timeout_secs = 30

[upload]
max_bytes = 2048
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.service.endpoint, "https://flows.example.com/api");
        assert_eq!(config.service.timeout_secs, Some(30));
        assert_eq!(config.upload.max_bytes, Some(2048));
        // Unspecified values should be defaults
        assert_eq!(config.upload.mime_types, vec!["image/*"]);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_unknown_format_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[reencode]\nformat = \"gif\"\n",
        )
        .unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig { max_threads: None };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_threads: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_threads: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_threads: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"quality = 0.9"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"quality = 0.7"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("quality").unwrap().as_float(), Some(0.7));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[reencode]
format = "jpeg"
quality = 0.9
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[reencode]
quality = 0.5
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let reencode = merged.get("reencode").unwrap();
        assert_eq!(reencode.get("quality").unwrap().as_float(), Some(0.5));
        assert_eq!(reencode.get("format").unwrap().as_str(), Some("jpeg"));
    }

    #[test]
    fn merge_toml_replaces_arrays() {
        let base: toml::Value = toml::from_str(r#"extensions = ["png", "jpg"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"extensions = ["dwg"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("extensions").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[reencode]
qualty = 0.9
"#;
        let result: Result<ToolsConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<ToolsConfig, _> = toml::from_str("[imagez]\nquality = 1\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(ToolsConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_range() {
        let mut config = ToolsConfig::default();
        config.reencode.quality = 1.0;
        assert!(config.validate().is_ok());
        config.reencode.quality = 1.5;
        assert!(config.validate().unwrap_err().to_string().contains("quality"));
        config.reencode.quality = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_accept_list() {
        let mut config = ToolsConfig::default();
        config.upload.mime_types.clear();
        config.upload.extensions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_endpoint_scheme() {
        let mut config = ToolsConfig::default();
        config.service.endpoint = "ftp://example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_limits() {
        let mut config = ToolsConfig::default();
        config.upload.max_bytes = Some(0);
        assert!(config.validate().is_err());

        let mut config = ToolsConfig::default();
        config.service.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[reencode]\nquality = 2.0\n").unwrap();
        let result = resolve_config(base, Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_raw_config_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert!(load_raw_config(tmp.path()).unwrap().is_none());
    }

    // =========================================================================
    // stock_config_toml / stock_defaults_value tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ToolsConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = ToolsConfig::default();
        assert_eq!(config.reencode.format, defaults.reencode.format);
        assert_eq!(config.reencode.quality, defaults.reencode.quality);
        assert_eq!(config.upload.extensions, defaults.upload.extensions);
        assert_eq!(config.service.endpoint, defaults.service.endpoint);
        assert_eq!(config.processing.max_threads, None);
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[reencode]", "[upload]", "[service]", "[processing]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        for section in ["reencode", "upload", "service", "processing"] {
            assert!(val.get(section).is_some(), "missing {section}");
        }
    }
}
