//! Upload accept-list: decides whether a file may be decoded at all.
//!
//! The check looks only at what the file *claims* to be (its declared MIME
//! type or its extension), never at its content. A file passes when either
//! matches. Rejection happens before a single byte is decoded.

use super::backend::DecodeError;
use std::path::Path;

/// Accept-list for a tool's file input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Accepted MIME types. `type/*` matches any subtype.
    pub mime_types: Vec<String>,
    /// Accepted extensions, lowercase, without the dot.
    pub extensions: Vec<String>,
    /// Optional size cap in bytes. `None` decodes arbitrarily large files.
    pub max_bytes: Option<u64>,
}

impl UploadPolicy {
    /// Accept anything declared as an image, plus the raster extensions the
    /// compiled-in decoders handle.
    pub fn images() -> Self {
        Self {
            mime_types: vec!["image/*".to_string()],
            extensions: ["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff", "ico"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_bytes: None,
        }
    }

    /// Accept only the given extensions (no MIME match).
    pub fn for_extensions(extensions: &[&str]) -> Self {
        Self {
            mime_types: Vec::new(),
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
            max_bytes: None,
        }
    }

    pub fn with_max_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_bytes = limit;
        self
    }

    /// Check a file's declared identity and size.
    pub fn check(
        &self,
        name: &str,
        declared_mime: Option<&str>,
        size: u64,
    ) -> Result<(), DecodeError> {
        let mime_ok = declared_mime.is_some_and(|mime| {
            self.mime_types
                .iter()
                .any(|pattern| mime_matches(pattern, mime))
        });
        let extension = extension_of(name);
        let ext_ok = extension
            .as_deref()
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));

        if !mime_ok && !ext_ok {
            let reason = match (declared_mime, extension) {
                (Some(mime), _) if !mime.trim().is_empty() => {
                    format!("type '{}' not accepted", mime.trim())
                }
                (_, Some(ext)) => format!("extension '{ext}' not accepted"),
                _ => "no type or extension".to_string(),
            };
            return Err(DecodeError::UnsupportedType {
                name: name.to_string(),
                reason,
            });
        }

        if let Some(limit) = self.max_bytes
            && size > limit
        {
            return Err(DecodeError::TooLarge {
                name: name.to_string(),
                size,
                limit,
            });
        }

        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::images()
    }
}

/// Lowercase extension of a file name, if any.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
}

fn mime_matches(pattern: &str, mime: &str) -> bool {
    // Parameters (`; charset=...`) never take part in the match.
    let mime = mime.split(';').next().unwrap_or("").trim();
    let pattern = pattern.trim();
    if mime.is_empty() {
        return false;
    }
    match pattern.strip_suffix("/*") {
        Some(kind) => mime
            .split_once('/')
            .is_some_and(|(k, _)| k.eq_ignore_ascii_case(kind)),
        None => pattern.eq_ignore_ascii_case(mime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_by_extension() {
        let policy = UploadPolicy::images();
        assert!(policy.check("photo.JPG", None, 10).is_ok());
        assert!(policy.check("scan.tiff", None, 10).is_ok());
    }

    #[test]
    fn accepts_by_wildcard_mime_despite_odd_extension() {
        let policy = UploadPolicy::images();
        assert!(policy.check("blob", Some("image/heic"), 10).is_ok());
        assert!(policy.check("x.dat", Some("IMAGE/PNG"), 10).is_ok());
    }

    #[test]
    fn rejects_text_file() {
        let policy = UploadPolicy::images();
        let err = policy.check("notes.txt", Some("text/plain"), 10).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedType { .. }));
        assert!(err.to_string().contains("text/plain"));
    }

    #[test]
    fn rejects_text_file_without_mime() {
        let policy = UploadPolicy::images();
        let err = policy.check("notes.txt", None, 10).unwrap_err();
        assert!(err.to_string().contains("'txt'"));
    }

    #[test]
    fn rejects_name_without_extension_or_mime() {
        let policy = UploadPolicy::images();
        let err = policy.check("README", None, 10).unwrap_err();
        assert!(err.to_string().contains("no type or extension"));
    }

    #[test]
    fn exact_mime_pattern() {
        let policy = UploadPolicy {
            mime_types: vec!["application/pdf".into()],
            extensions: vec![],
            max_bytes: None,
        };
        assert!(policy.check("a", Some("application/pdf"), 1).is_ok());
        assert!(policy.check("a", Some("application/pdf; q=1"), 1).is_ok());
        assert!(policy.check("a", Some("application/zip"), 1).is_err());
    }

    #[test]
    fn extension_only_policy_ignores_mime() {
        let policy = UploadPolicy::for_extensions(&["DWG"]);
        assert!(policy.check("plan.dwg", None, 1).is_ok());
        assert!(policy.check("plan.png", Some("image/png"), 1).is_err());
    }

    #[test]
    fn no_size_limit_by_default() {
        let policy = UploadPolicy::images();
        assert!(policy.check("huge.png", None, u64::MAX).is_ok());
    }

    #[test]
    fn size_limit_applies_after_type_check() {
        let policy = UploadPolicy::images().with_max_bytes(Some(100));
        assert!(policy.check("ok.png", None, 100).is_ok());
        assert!(matches!(
            policy.check("big.png", None, 101),
            Err(DecodeError::TooLarge { size: 101, limit: 100, .. })
        ));
        assert!(matches!(
            policy.check("big.txt", None, 101),
            Err(DecodeError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn extension_of_handles_edge_cases() {
        assert_eq!(extension_of("a.b.PNG").as_deref(), Some("png"));
        assert_eq!(extension_of(".bashrc"), None);
        assert_eq!(extension_of("noext"), None);
    }
}
