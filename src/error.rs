//! Error taxonomy for endpoint dispatch.
//!
//! Every recoverable failure in the pipeline is classified into exactly one
//! [`ApiError`] variant and surfaced through the result channel. The set is
//! deliberately closed (no `#[non_exhaustive]`) so callers can match on it
//! exhaustively. No variant carries retry metadata; retrying is entirely the
//! caller's responsibility.

use thiserror::Error;

/// Result type alias for all dispatch operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Classified dispatch failures.
///
/// `DataTask` and `Decoding` pass the underlying transport/decoder
/// diagnostic through verbatim; the remaining variants render fixed text,
/// with `InvalidResponseStatus` interpolating the observed code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The endpoint could not be resolved to a syntactically valid URL.
    #[error("the endpoint URL is invalid")]
    InvalidUrl,

    /// The response carried a status code outside the accepted set.
    #[error("the response status code {0} is invalid")]
    InvalidResponseStatus(String),

    /// The transport call itself failed (connection error, timeout, ...),
    /// independent of any HTTP status.
    #[error("{0}")]
    DataTask(String),

    /// The transport completed but returned no response body.
    #[error("the response data is corrupt")]
    CorruptData,

    /// The response body could not be decoded into the requested type.
    #[error("{0}")]
    Decoding(String),

    /// The request could not be assembled: body serialization or header
    /// encoding failed. Surfaced as an error rather than silently sending a
    /// degraded request.
    #[error("failed to encode the request: {0}")]
    Encoding(String),
}

impl ApiError {
    /// Creates an `InvalidResponseStatus` error from a numeric status code.
    pub fn invalid_status(code: u16) -> Self {
        Self::InvalidResponseStatus(code.to_string())
    }

    /// Creates a `DataTask` error carrying the transport diagnostic.
    pub fn data_task(message: impl Into<String>) -> Self {
        Self::DataTask(message.into())
    }

    /// Creates a `Decoding` error carrying the decoder diagnostic.
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding(message.into())
    }

    /// Creates an `Encoding` error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }
}
