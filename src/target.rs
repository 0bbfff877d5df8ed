//! Declarative endpoint descriptions.
//!
//! A [`Target`] describes one logical endpoint: where it lives, how to call
//! it and how the body is encoded. Targets are plain values with no
//! behavior beyond field access and defaults; they are consumed once by the
//! request builder and own no resources.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, Result};

/// Request timeout applied when a target does not override [`Target::timeout`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP methods supported by endpoint descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// GET request.
    #[default]
    Get,
    /// POST request.
    Post,
    /// PUT request.
    Put,
    /// DELETE request.
    Delete,
}

impl Method {
    /// Uppercase wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Body encoding mode.
///
/// `Json` injects a `Content-Type: application/json` header whether or not
/// a body is present; `Url` leaves the headers alone and attaches any body
/// verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// No content-type injection; the body is sent as provided.
    Url,
    /// JSON content type, body serialized from a structured value.
    #[default]
    Json,
}

/// A request body: either pre-encoded bytes or a structured value that the
/// request builder serializes to JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Pre-encoded bytes, attached to the request verbatim.
    Raw(Vec<u8>),
    /// A structured value serialized to JSON at request-build time.
    Json(Value),
}

impl Body {
    /// Builds a JSON body from any serializable value.
    ///
    /// Serialization failure is surfaced as [`ApiError::Encoding`] instead
    /// of producing a request with a silently missing body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| ApiError::encoding(e.to_string()))
    }

    /// Builds a raw body from pre-encoded bytes.
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Raw(bytes.into())
    }
}

/// One query-string item, in order of appearance.
///
/// A `None` value renders as a bare key with no `=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryItem {
    /// Query parameter name.
    pub key: String,
    /// Query parameter value, absent for flag-style parameters.
    pub value: Option<String>,
}

impl QueryItem {
    /// Creates a key/value query item.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Creates a value-less query item.
    pub fn flag(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }
}

/// Declarative description of one HTTP endpoint call.
///
/// Implement this per logical call site; everything except [`path`] has a
/// default. A target without its own [`base_url`] falls back to the base
/// URL configured on the dispatching [`Client`](crate::client::Client).
///
/// # Example
///
/// ```rust
/// use waypost::{QueryItem, Target};
///
/// struct SearchUsers {
///     term: String,
/// }
///
/// impl Target for SearchUsers {
///     fn path(&self) -> &str {
///         "v1/users/search"
///     }
///
///     fn query_items(&self) -> Vec<QueryItem> {
///         vec![QueryItem::new("q", self.term.clone())]
///     }
/// }
/// ```
///
/// [`path`]: Target::path
/// [`base_url`]: Target::base_url
pub trait Target {
    /// Root origin for this endpoint, overriding the client default.
    fn base_url(&self) -> Option<&str> {
        None
    }

    /// Path appended to the base URL, segment by segment.
    fn path(&self) -> &str;

    /// HTTP method (default GET).
    fn method(&self) -> Method {
        Method::default()
    }

    /// Extra request headers (default none).
    fn headers(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Query-string items in the order they should appear (default none).
    fn query_items(&self) -> Vec<QueryItem> {
        Vec::new()
    }

    /// Request body (default none).
    fn body(&self) -> Option<Body> {
        None
    }

    /// Body encoding mode (default JSON).
    fn encoding(&self) -> Encoding {
        Encoding::default()
    }

    /// Request timeout (default 120 seconds).
    fn timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }
}
