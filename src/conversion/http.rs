//! Blocking HTTP client for the remote conversion service.

use super::wire::{FlowRequest, FlowResponse, upstream_message};
use super::{ConversionOutput, ConversionService, Flow, ServiceError};
use crate::config::ServiceConfig;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;

/// Talks to `<endpoint>/<operation>` with one JSON POST per conversion.
pub struct HttpConversionService {
    endpoint: String,
    client: Client,
}

impl HttpConversionService {
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        Self::with_timeout(&config.endpoint, config.timeout_secs.map(Duration::from_secs))
    }

    /// `timeout` of `None` waits indefinitely.
    pub fn with_timeout(endpoint: &str, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Client(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint_url(&self, flow: Flow) -> String {
        format!("{}/{}", self.endpoint, flow.operation())
    }
}

impl ConversionService for HttpConversionService {
    fn convert(
        &self,
        flow: Flow,
        source: &[u8],
        source_name: &str,
    ) -> Result<ConversionOutput, ServiceError> {
        let body = serde_json::to_string(&FlowRequest::new(flow, source, source_name))
            .map_err(|e| ServiceError::Client(e.to_string()))?;
        let url = self.endpoint_url(flow);
        log::debug!("POST {url} ({} byte body)", body.len());

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                code: status.as_u16(),
                message: upstream_message(&text),
            });
        }

        let parsed: FlowResponse = serde_json::from_str(&text)
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;
        parsed.into_output(flow, source_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_joins_operation() {
        let service =
            HttpConversionService::with_timeout("http://localhost:3400/api/flows/", None).unwrap();
        assert_eq!(
            service.endpoint_url(Flow::DjvuToPdf),
            "http://localhost:3400/api/flows/djvuToPdfFlow"
        );
    }

    #[test]
    fn unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let service = HttpConversionService::with_timeout(
            "http://127.0.0.1:9/api/flows",
            Some(Duration::from_secs(2)),
        )
        .unwrap();
        let result = service.convert(Flow::CsvToPdf, b"a,b", "t.csv");
        assert!(matches!(result, Err(ServiceError::Transport(_))));
    }
}
