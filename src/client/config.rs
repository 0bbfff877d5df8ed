use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::{ApiError, Result};

/// Client configuration.
///
/// The base URL is injected here at construction time and read by every
/// request build; there is no ambient mutable base-URL state anywhere in
/// the crate.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL applied when a target does not carry its own.
    pub base_url: Option<Url>,
    /// Default `User-Agent` header value.
    pub user_agent: String,
    /// TCP connection timeout (default: 10 seconds).
    pub connect_timeout: Duration,
    /// Emit a diagnostic report for every dispatch, not only those that
    /// ask for logs individually.
    pub verbose: bool,
    /// Observer receiving diagnostic reports.
    pub diagnostics: Arc<dyn DiagnosticSink>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: concat!("waypost/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(10),
            verbose: false,
            diagnostics: Arc::new(TracingSink),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the string is not a valid URL.
    pub fn with_base_url(base_url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(base_url.as_ref()).map_err(|_| ApiError::InvalidUrl)?;
        Ok(Self {
            base_url: Some(url),
            ..Self::default()
        })
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("connect_timeout", &self.connect_timeout)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}
