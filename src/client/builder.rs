use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{ApiError, Result};

use super::config::ClientConfig;

/// Dispatches declarative endpoint descriptions over HTTP.
///
/// Cloning is cheap: clones share the underlying transport and the
/// callback serialization gate.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
    callback_gate: Arc<Mutex<()>>,
}

impl Client {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP transport cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::data_task(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            callback_gate: Arc::new(Mutex::new(())),
        })
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn callback_gate(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.callback_gate)
    }
}
