//! JSON bodies exchanged with the conversion service.
//!
//! Request:
//!
//! ```json
//! { "flow": "dwgToJpgFlow", "dataUri": "data:image/vnd.dwg;base64,...", "fileName": "plan.dwg" }
//! ```
//!
//! Response, exactly one of `dataUri` / `archiveDataUri`:
//!
//! ```json
//! { "dataUri": "data:image/jpeg;base64,...", "fileName": "plan.jpg", "itemCount": 1 }
//! ```

use super::{ConversionOutput, Flow, Payload, ServiceError, derive_result_name};
use crate::data_uri::DataUri;
use crate::imaging::accept::extension_of;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRequest<'a> {
    pub flow: &'static str,
    pub data_uri: DataUri,
    pub file_name: &'a str,
}

impl<'a> FlowRequest<'a> {
    pub fn new(flow: Flow, source: &[u8], source_name: &'a str) -> Self {
        Self {
            flow: flow.operation(),
            data_uri: DataUri::encode(source_mime(source_name), source),
            file_name: source_name,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResponse {
    #[serde(default)]
    pub data_uri: Option<DataUri>,
    #[serde(default)]
    pub archive_data_uri: Option<DataUri>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub item_count: Option<u32>,
}

impl FlowResponse {
    /// Turn the response into a downloadable output.
    pub fn into_output(
        self,
        flow: Flow,
        source_name: &str,
    ) -> Result<ConversionOutput, ServiceError> {
        let malformed = |e: &dyn std::fmt::Display| ServiceError::MalformedResponse(e.to_string());
        let (payload, extension) = match (self.data_uri, self.archive_data_uri) {
            (Some(uri), None) => (
                Payload::Single(uri.decode().map_err(|e| malformed(&e))?),
                flow.output_extension(),
            ),
            (None, Some(uri)) => (
                Payload::Archive(uri.decode().map_err(|e| malformed(&e))?),
                "zip",
            ),
            (Some(_), Some(_)) => {
                return Err(ServiceError::MalformedResponse(
                    "both dataUri and archiveDataUri present".into(),
                ));
            }
            (None, None) => {
                return Err(ServiceError::MalformedResponse(
                    "no dataUri or archiveDataUri".into(),
                ));
            }
        };
        if payload.bytes().is_empty() {
            return Err(ServiceError::MalformedResponse("empty payload".into()));
        }

        let result_name = self
            .file_name
            .as_deref()
            .and_then(safe_file_name)
            .unwrap_or_else(|| derive_result_name(source_name, extension));
        let item_count = self.item_count.unwrap_or(1).max(1);

        Ok(ConversionOutput {
            payload,
            result_name,
            item_count,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

/// Best human-readable message from an error response body.
pub fn upstream_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && !parsed.error.trim().is_empty()
    {
        return parsed.error.trim().to_string();
    }
    let text = body.trim();
    if text.is_empty() {
        "no details".to_string()
    } else {
        text.chars().take(200).collect()
    }
}

/// Strip any directory part a remote name might carry.
fn safe_file_name(name: &str) -> Option<String> {
    Path::new(name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Declared MIME of an outgoing file, by extension.
fn source_mime(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("dwg") => "image/vnd.dwg",
        Some("djvu" | "djv") => "image/vnd.djvu",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("csv") => "text/csv",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("html" | "htm") => "text/html",
        Some("mhtml") => "multipart/related",
        Some("tif" | "tiff") => "image/tiff",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
