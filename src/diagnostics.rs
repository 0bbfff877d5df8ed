//! Dispatch diagnostics as an injectable observer.
//!
//! When a dispatch asks for logs (per call or via the client's verbose
//! flag), the pipeline assembles a [`DiagnosticReport`] and hands it to the
//! configured [`DiagnosticSink`]. Reports are strictly observational: the
//! sink never influences control flow or the returned value, and tests can
//! inject their own sink to assert on emitted diagnostics without capturing
//! process output.

use tracing::{debug, error};

/// Everything known about one completed (or failed) dispatch.
#[derive(Debug, Clone)]
pub struct DiagnosticReport {
    /// HTTP method, uppercase.
    pub method: &'static str,
    /// Final request URL, query string included.
    pub url: String,
    /// Request headers as sent.
    pub headers: Vec<(String, String)>,
    /// Request body, pretty-printed when it was JSON.
    pub request_body: Option<String>,
    /// Response status code, absent when the transport call itself failed.
    pub status: Option<u16>,
    /// Response body, pretty-printed when it was JSON.
    pub response_body: Option<String>,
    /// Classified error text for failure paths.
    pub error: Option<String>,
}

/// Observer receiving diagnostic reports.
pub trait DiagnosticSink: Send + Sync {
    /// Called once per dispatch that requested diagnostics.
    fn emit(&self, report: &DiagnosticReport);
}

/// Default sink forwarding reports to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, report: &DiagnosticReport) {
        match &report.error {
            None => debug!(
                method = report.method,
                url = %report.url,
                status = report.status,
                response = report.response_body.as_deref().unwrap_or(""),
                "request completed"
            ),
            Some(message) => error!(
                method = report.method,
                url = %report.url,
                status = report.status,
                response = report.response_body.as_deref().unwrap_or(""),
                error = %message,
                "request failed"
            ),
        }
    }
}

/// Renders body bytes for a report: pretty-printed JSON when the bytes
/// parse as JSON, lossy UTF-8 otherwise.
pub(crate) fn pretty_body(bytes: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned()),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
