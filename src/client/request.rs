//! Wire request assembly.
//!
//! [`build_request`] is a pure function from a target description to a
//! ready-to-send request: same descriptor in, byte-identical request out.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use url::Url;

use crate::error::{ApiError, Result};
use crate::target::{Body, Encoding, Method, QueryItem, Target};

/// A fully resolved request, ready for exactly one transport submission.
#[derive(Debug, Clone)]
pub struct WireRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, query string included.
    pub url: Url,
    /// Headers as they will be sent.
    pub headers: HeaderMap,
    /// Encoded body bytes, if any.
    pub body: Option<Vec<u8>>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Builds the wire request for a target.
///
/// The target's own base URL wins over `fallback_base` (typically the
/// client's configured base). With neither present, or with an unparsable
/// base, this fails with [`ApiError::InvalidUrl`]; body serialization and
/// header assembly failures surface as [`ApiError::Encoding`].
pub fn build_request(target: &dyn Target, fallback_base: Option<&Url>) -> Result<WireRequest> {
    let mut url = match target.base_url() {
        Some(raw) => Url::parse(raw).map_err(|_| ApiError::InvalidUrl)?,
        None => fallback_base.cloned().ok_or(ApiError::InvalidUrl)?,
    };

    append_path(&mut url, target.path())?;

    let mut headers = HeaderMap::new();
    for (key, value) in target.headers() {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ApiError::encoding(format!("invalid header name '{key}': {e}")))?;
        let value = HeaderValue::from_str(&value)
            .map_err(|e| ApiError::encoding(format!("invalid value for header '{key}': {e}")))?;
        headers.insert(name, value);
    }

    if target.encoding() == Encoding::Json {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    // Every dispatch is a fresh network fetch; never serve from a cache.
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    let body = match target.body() {
        None => None,
        Some(Body::Raw(bytes)) => Some(bytes),
        Some(Body::Json(value)) => Some(
            serde_json::to_vec(&value).map_err(|e| ApiError::encoding(e.to_string()))?,
        ),
    };

    let query = render_query(&target.query_items());
    if !query.is_empty() {
        url.set_query(Some(&query));
    }

    Ok(WireRequest {
        method: target.method(),
        url,
        headers,
        body,
        timeout: target.timeout(),
    })
}

/// Appends `path` to the URL segment by segment, so joining never
/// duplicates or drops separating slashes.
fn append_path(url: &mut Url, path: &str) -> Result<()> {
    if path.is_empty() {
        return Ok(());
    }
    let mut segments = url.path_segments_mut().map_err(|_| ApiError::InvalidUrl)?;
    segments.pop_if_empty();
    segments.extend(path.split('/').filter(|s| !s.is_empty()));
    Ok(())
}

/// Renders query items in order, percent-encoding keys and values.
/// Value-less items become a bare key.
fn render_query(items: &[QueryItem]) -> String {
    items
        .iter()
        .map(|item| match &item.value {
            Some(value) => format!(
                "{}={}",
                urlencoding::encode(&item.key),
                urlencoding::encode(value)
            ),
            None => urlencoding::encode(&item.key).into_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}
