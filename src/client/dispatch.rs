//! The dispatch pipeline: one transport call, validated and decoded.
//!
//! Both entry shapes share a single pipeline. The awaitable form awaits it
//! directly; the callback form spawns it and attaches the continuation,
//! with all continuations serialized against one client-owned gate so
//! concurrent completions are observed one at a time.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{instrument, warn};

use crate::decode::{decode, DateDecodingStrategy, KeyDecodingStrategy};
use crate::diagnostics::{pretty_body, DiagnosticReport};
use crate::error::{ApiError, Result};
use crate::target::Target;

use super::builder::Client;
use super::request::{build_request, WireRequest};

/// Status codes treated as success.
///
/// The wider 200..=202 policy is used: resources created or accepted
/// asynchronously decode the same way as a plain 200.
const ACCEPTED_STATUS: [u16; 3] = [200, 201, 202];

/// Per-dispatch options: decoding strategies and diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    /// How timestamps in the response are interpreted.
    pub date_strategy: DateDecodingStrategy,
    /// How response keys are mapped onto field names.
    pub key_strategy: KeyDecodingStrategy,
    /// Emit a diagnostic report for this dispatch even when the client is
    /// not verbose.
    pub with_logs: bool,
}

impl Client {
    /// Dispatches a target and decodes the response into `T`, with default
    /// options.
    pub async fn dispatch<T: DeserializeOwned>(&self, target: &dyn Target) -> Result<T> {
        self.dispatch_with(target, DispatchOptions::default()).await
    }

    /// Dispatches a target with explicit options.
    ///
    /// Issues exactly one transport call, then classifies the outcome:
    /// transport failure → [`ApiError::DataTask`], status outside the
    /// accepted set → [`ApiError::InvalidResponseStatus`], empty body →
    /// [`ApiError::CorruptData`], undecodable body →
    /// [`ApiError::Decoding`].
    #[instrument(name = "dispatch", skip(self, target, options), fields(path = %target.path()))]
    pub async fn dispatch_with<T: DeserializeOwned>(
        &self,
        target: &dyn Target,
        options: DispatchOptions,
    ) -> Result<T> {
        let wire = build_request(target, self.config().base_url.as_ref())?;
        self.run_pipeline(&wire, options).await
    }

    /// Dispatches a target and delivers the result to `on_complete`.
    ///
    /// Non-blocking: the request is built eagerly (so descriptor errors
    /// reach the callback too), the transport call runs on the current
    /// tokio runtime, and `on_complete` fires exactly once. Callback
    /// invocations from concurrent dispatches on this client (and its
    /// clones) are serialized against a single gate.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn dispatch_callback<T, F>(&self, target: &dyn Target, options: DispatchOptions, on_complete: F)
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T>) + Send + 'static,
    {
        let prepared = build_request(target, self.config().base_url.as_ref());
        let client = self.clone();
        tokio::spawn(async move {
            let result = match prepared {
                Ok(wire) => client.run_pipeline(&wire, options).await,
                Err(err) => Err(err),
            };
            let gate = client.callback_gate();
            let _serialized = gate.lock().await;
            on_complete(result);
        });
    }

    /// The shared pipeline body: submit, classify, decode, report.
    async fn run_pipeline<T: DeserializeOwned>(
        &self,
        wire: &WireRequest,
        options: DispatchOptions,
    ) -> Result<T> {
        let report = options.with_logs || self.config().verbose;

        match self.submit(wire).await {
            Err(err) => {
                if report {
                    self.config()
                        .diagnostics
                        .emit(&transport_failure_report(wire, &err));
                }
                Err(err)
            }
            Ok((status, body)) => {
                let result = validate_and_decode(status, &body, options);
                if report {
                    self.config().diagnostics.emit(&response_report(
                        wire,
                        status,
                        &body,
                        result.as_ref().err(),
                    ));
                }
                result
            }
        }
    }

    /// Issues exactly one transport call.
    async fn submit(&self, wire: &WireRequest) -> Result<(StatusCode, Vec<u8>)> {
        let mut request = self
            .http()
            .request(wire.method.into(), wire.url.clone())
            .headers(wire.headers.clone())
            .timeout(wire.timeout);

        if let Some(body) = &wire.body {
            request = request.body(body.clone());
        }

        let response = request.send().await.map_err(|e| {
            warn!(url = %wire.url, error = %e, "transport call failed");
            ApiError::data_task(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::data_task(e.to_string()))?
            .to_vec();

        Ok((status, body))
    }
}

fn validate_and_decode<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
    options: DispatchOptions,
) -> Result<T> {
    if !ACCEPTED_STATUS.contains(&status.as_u16()) {
        return Err(ApiError::invalid_status(status.as_u16()));
    }
    if body.is_empty() {
        return Err(ApiError::CorruptData);
    }
    decode(body, options.date_strategy, options.key_strategy)
        .map_err(|e| ApiError::decoding(e.to_string()))
}

fn base_report(wire: &WireRequest) -> DiagnosticReport {
    let headers = wire
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                value.to_str().unwrap_or("<opaque>").to_string(),
            )
        })
        .collect();

    DiagnosticReport {
        method: wire.method.as_str(),
        url: wire.url.to_string(),
        headers,
        request_body: wire.body.as_deref().map(pretty_body),
        status: None,
        response_body: None,
        error: None,
    }
}

fn transport_failure_report(wire: &WireRequest, err: &ApiError) -> DiagnosticReport {
    DiagnosticReport {
        error: Some(err.to_string()),
        ..base_report(wire)
    }
}

fn response_report(
    wire: &WireRequest,
    status: StatusCode,
    body: &[u8],
    err: Option<&ApiError>,
) -> DiagnosticReport {
    DiagnosticReport {
        status: Some(status.as_u16()),
        response_body: Some(pretty_body(body)),
        error: err.map(ToString::to_string),
        ..base_report(wire)
    }
}
