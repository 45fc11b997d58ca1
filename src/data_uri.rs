//! Base64 data URIs: `data:<mime>;base64,<payload>`.
//!
//! Every tool hands its output around as a data URI: the re-encode
//! pipeline produces one, the remote conversion flows send and receive them.
//! [`DataUri`] keeps the MIME type and the base64 payload apart so the byte
//! size can be derived from the payload length without decoding it.
//!
//! Only the base64 form is supported. Percent-encoded (`data:,Hello`) URIs
//! are rejected with [`DataUriError::NotBase64`].

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";
const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DataUriError {
    #[error("missing 'data:' scheme")]
    MissingScheme,
    #[error("missing ',' between header and payload")]
    MissingPayload,
    #[error("only base64 data URIs are supported")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    InvalidPayload(String),
}

/// A parsed base64 data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    mime: String,
    payload: String,
}

impl DataUri {
    /// Encode raw bytes under the given MIME type.
    pub fn encode(mime: &str, bytes: &[u8]) -> Self {
        Self {
            mime: normalize_mime(mime),
            payload: STANDARD.encode(bytes),
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` string.
    ///
    /// The payload is validated (alphabet, length, padding) but not decoded.
    pub fn parse(input: &str) -> Result<Self, DataUriError> {
        let rest = input
            .trim()
            .strip_prefix(SCHEME)
            .ok_or(DataUriError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingPayload)?;
        let mime = header
            .strip_suffix(BASE64_MARKER)
            .ok_or(DataUriError::NotBase64)?;
        validate_payload(payload)?;
        Ok(Self {
            mime: normalize_mime(mime),
            payload: payload.to_string(),
        })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// The base64 payload, without the header.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Size of the decoded payload in bytes, computed from the base64 length.
    pub fn byte_size(&self) -> u64 {
        base64_decoded_len(&self.payload)
    }

    /// Decode the payload back to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, DataUriError> {
        STANDARD
            .decode(&self.payload)
            .map_err(|e| DataUriError::InvalidPayload(e.to_string()))
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}{BASE64_MARKER},{}", self.mime, self.payload)
    }
}

impl FromStr for DataUri {
    type Err = DataUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DataUri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DataUri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Number of bytes a padded base64 string decodes to.
///
/// `len * 3 / 4` minus one byte per trailing `=`. Assumes a payload that has
/// already passed validation.
pub fn base64_decoded_len(payload: &str) -> u64 {
    let padding = payload
        .bytes()
        .rev()
        .take(2)
        .take_while(|&b| b == b'=')
        .count();
    (payload.len() as u64 * 3 / 4).saturating_sub(padding as u64)
}

fn normalize_mime(mime: &str) -> String {
    let trimmed = mime.trim();
    if trimmed.is_empty() {
        FALLBACK_MIME.to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

fn validate_payload(payload: &str) -> Result<(), DataUriError> {
    if payload.len() % 4 != 0 {
        return Err(DataUriError::InvalidPayload(format!(
            "length {} is not a multiple of 4",
            payload.len()
        )));
    }
    let body = payload.trim_end_matches('=');
    if payload.len() - body.len() > 2 {
        return Err(DataUriError::InvalidPayload("too much padding".into()));
    }
    if let Some(bad) = body
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '+' || *c == '/'))
    {
        return Err(DataUriError::InvalidPayload(format!(
            "unexpected character {bad:?}"
        )));
    }
    Ok(())
}
