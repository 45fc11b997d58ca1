//! Remote format conversion ("AI flows").
//!
//! Exotic formats (DWG, DjVu, HEIC, ...) are not converted locally. Each
//! converter forwards the file to an opaque remote conversion service and
//! downloads whatever comes back. This module models all of them as one
//! interface:
//!
//! ```text
//! convert(flow, source bytes, source name) -> { single file | archive, result name, item count }
//! ```
//!
//! [`Flow`] has one variant per declared schema; it owns the remote operation
//! name, the accepted input extensions and the output extension. The
//! [`ConversionService`] trait is the seam: [`HttpConversionService`] talks
//! to the real endpoint, tests substitute a recording mock.
//!
//! Conversion fidelity is entirely up to the remote side and cannot be
//! verified here. Calls are made once: no retry, and no timeout unless one is
//! configured.

mod http;
pub mod wire;

pub use http::HttpConversionService;

use crate::imaging::{DecodeError, UploadPolicy};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Input rejected: {0}")]
    Rejected(#[from] DecodeError),
    #[error("Could not create HTTP client: {0}")]
    Client(String),
    #[error("Conversion service unreachable: {0}")]
    Transport(String),
    #[error("Conversion service returned HTTP {code}: {message}")]
    Status { code: u16, message: String },
    #[error("Malformed response from conversion service: {0}")]
    MalformedResponse(String),
}

/// A named remote conversion with a fixed input/output schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    DwgToJpg,
    DjvuToPdf,
    WebpToSvg,
    BmpToPnm,
    CsvToPdf,
    HeicToPdf,
    WebpageToPdf,
    TiffToPdf,
    /// One JPEG per page, returned as a zip.
    PdfToJpg,
}

impl Flow {
    pub const ALL: [Flow; 9] = [
        Flow::DwgToJpg,
        Flow::DjvuToPdf,
        Flow::WebpToSvg,
        Flow::BmpToPnm,
        Flow::CsvToPdf,
        Flow::HeicToPdf,
        Flow::WebpageToPdf,
        Flow::TiffToPdf,
        Flow::PdfToJpg,
    ];

    /// CLI name, e.g. `dwg-to-jpg`.
    pub fn name(self) -> &'static str {
        match self {
            Self::DwgToJpg => "dwg-to-jpg",
            Self::DjvuToPdf => "djvu-to-pdf",
            Self::WebpToSvg => "webp-to-svg",
            Self::BmpToPnm => "bmp-to-pnm",
            Self::CsvToPdf => "csv-to-pdf",
            Self::HeicToPdf => "heic-to-pdf",
            Self::WebpageToPdf => "webpage-to-pdf",
            Self::TiffToPdf => "tiff-to-pdf",
            Self::PdfToJpg => "pdf-to-jpg",
        }
    }

    /// Operation name on the remote service.
    pub fn operation(self) -> &'static str {
        match self {
            Self::DwgToJpg => "dwgToJpgFlow",
            Self::DjvuToPdf => "djvuToPdfFlow",
            Self::WebpToSvg => "webpToSvgFlow",
            Self::BmpToPnm => "bmpToPnmFlow",
            Self::CsvToPdf => "csvToPdfFlow",
            Self::HeicToPdf => "heicToPdfFlow",
            Self::WebpageToPdf => "webpageToPdfFlow",
            Self::TiffToPdf => "tiffToPdfFlow",
            Self::PdfToJpg => "pdfToJpgFlow",
        }
    }

    pub fn input_extensions(self) -> &'static [&'static str] {
        match self {
            Self::DwgToJpg => &["dwg"],
            Self::DjvuToPdf => &["djvu", "djv"],
            Self::WebpToSvg => &["webp"],
            Self::BmpToPnm => &["bmp"],
            Self::CsvToPdf => &["csv"],
            Self::HeicToPdf => &["heic", "heif"],
            Self::WebpageToPdf => &["html", "htm", "mhtml"],
            Self::TiffToPdf => &["tif", "tiff"],
            Self::PdfToJpg => &["pdf"],
        }
    }

    /// Extension of a single converted file.
    pub fn output_extension(self) -> &'static str {
        match self {
            Self::DwgToJpg | Self::PdfToJpg => "jpg",
            Self::WebpToSvg => "svg",
            Self::BmpToPnm => "pnm",
            Self::DjvuToPdf
            | Self::CsvToPdf
            | Self::HeicToPdf
            | Self::WebpageToPdf
            | Self::TiffToPdf => "pdf",
        }
    }

    /// Whether the service may answer with a zip of several files.
    pub fn may_return_archive(self) -> bool {
        matches!(self, Self::PdfToJpg)
    }

    /// Accept-list for this flow's input.
    pub fn upload_policy(self) -> UploadPolicy {
        UploadPolicy::for_extensions(self.input_extensions())
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let wanted = input.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|flow| flow.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|f| f.name()).collect();
                format!("unknown flow '{input}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Converted content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Single(Vec<u8>),
    Archive(Vec<u8>),
}

impl Payload {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Single(b) | Self::Archive(b) => b,
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Archive(_))
    }
}

/// What a conversion hands back for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    pub payload: Payload,
    pub result_name: String,
    pub item_count: u32,
}

/// An opaque remote conversion service.
pub trait ConversionService {
    fn convert(
        &self,
        flow: Flow,
        source: &[u8],
        source_name: &str,
    ) -> Result<ConversionOutput, ServiceError>;
}

/// Check the flow's accept-list, then call the service.
///
/// Nothing is sent when the input is rejected.
pub fn run_flow(
    service: &impl ConversionService,
    flow: Flow,
    source: &[u8],
    source_name: &str,
) -> Result<ConversionOutput, ServiceError> {
    flow.upload_policy()
        .check(source_name, None, source.len() as u64)?;
    if source.is_empty() {
        return Err(DecodeError::Empty {
            name: source_name.to_string(),
        }
        .into());
    }
    log::info!("{flow}: sending {source_name} ({} bytes)", source.len());
    match service.convert(flow, source, source_name) {
        Ok(output) => {
            log::info!(
                "{flow}: received {} ({} item(s), {} bytes)",
                output.result_name,
                output.item_count,
                output.payload.bytes().len()
            );
            Ok(output)
        }
        Err(err) => {
            log::warn!("{flow}: {source_name} failed: {err}");
            Err(err)
        }
    }
}

/// Result file name: the source stem with a new extension.
pub fn derive_result_name(source_name: &str, extension: &str) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("converted");
    format!("{stem}.{extension}")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock service that records calls and answers with a canned result.
    pub struct MockService {
        pub calls: Mutex<Vec<(Flow, String, usize)>>,
        pub fail_with: Option<String>,
    }

    impl MockService {
        pub fn ok() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_with: None,
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_with: Some(message.to_string()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl ConversionService for MockService {
        fn convert(
            &self,
            flow: Flow,
            source: &[u8],
            source_name: &str,
        ) -> Result<ConversionOutput, ServiceError> {
            self.calls
                .lock()
                .unwrap()
                .push((flow, source_name.to_string(), source.len()));
            if let Some(message) = &self.fail_with {
                return Err(ServiceError::Status {
                    code: 500,
                    message: message.clone(),
                });
            }
            Ok(ConversionOutput {
                payload: Payload::Single(b"converted".to_vec()),
                result_name: derive_result_name(source_name, flow.output_extension()),
                item_count: 1,
            })
        }
    }

    #[test]
    fn flow_names_round_trip_through_from_str() {
        for flow in Flow::ALL {
            assert_eq!(flow.name().parse::<Flow>(), Ok(flow));
        }
        assert_eq!("HEIC_TO_PDF".parse::<Flow>(), Ok(Flow::HeicToPdf));
    }

    #[test]
    fn unknown_flow_lists_choices() {
        let err = "png-to-gif".parse::<Flow>().unwrap_err();
        assert!(err.contains("dwg-to-jpg"));
    }

    #[test]
    fn only_pdf_to_jpg_returns_archives() {
        let archive_flows: Vec<Flow> = Flow::ALL
            .into_iter()
            .filter(|f| f.may_return_archive())
            .collect();
        assert_eq!(archive_flows, vec![Flow::PdfToJpg]);
    }

    #[test]
    fn run_flow_calls_service_for_accepted_input() {
        let service = MockService::ok();
        let output = run_flow(&service, Flow::DwgToJpg, b"AC1032", "floor-plan.DWG").unwrap();
        assert_eq!(output.result_name, "floor-plan.jpg");
        assert_eq!(output.item_count, 1);
        assert_eq!(service.call_count(), 1);
    }

    #[test]
    fn run_flow_rejects_wrong_extension_without_calling() {
        let service = MockService::ok();
        let result = run_flow(&service, Flow::CsvToPdf, b"a,b", "table.xlsx");
        assert!(matches!(result, Err(ServiceError::Rejected(_))));
        assert_eq!(service.call_count(), 0);
    }

    #[test]
    fn run_flow_rejects_empty_input_without_calling() {
        let service = MockService::ok();
        let result = run_flow(&service, Flow::CsvToPdf, b"", "table.csv");
        assert!(matches!(
            result,
            Err(ServiceError::Rejected(DecodeError::Empty { .. }))
        ));
        assert_eq!(service.call_count(), 0);
    }

    #[test]
    fn run_flow_surfaces_upstream_message() {
        let service = MockService::failing("model overloaded");
        let err = run_flow(&service, Flow::HeicToPdf, b"ftypheic", "IMG_0001.heic").unwrap_err();
        assert!(err.to_string().contains("model overloaded"));
    }

    #[test]
    fn derive_result_name_uses_stem() {
        assert_eq!(derive_result_name("report.final.csv", "pdf"), "report.final.pdf");
        assert_eq!(derive_result_name("", "zip"), "converted.zip");
    }
}
