//! Where situations come from.

use async_trait::async_trait;
use tracing::debug;
use transit_core::{Error, Result};

use crate::config::FeedConfig;
use crate::situation::{Situation, parse_service_status};

/// Supplies the current list of service situations.
#[async_trait]
pub trait SituationSource: Send + Sync {
    /// Fetch and parse the current situations.
    ///
    /// # Errors
    ///
    /// Returns `Error::FetchFailed` or `Error::FeedParseFailed` on a
    /// transient upstream failure.
    async fn fetch_situations(&self) -> Result<Vec<Situation>>;
}

/// Fetches the service-status document over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSituationSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSituationSource {
    /// Build a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the HTTP client cannot be built.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("transit-uptime/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::invalid_config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// The document URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SituationSource for HttpSituationSource {
    async fn fetch_situations(&self) -> Result<Vec<Situation>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::fetch_failed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch_failed(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::fetch_failed(format!("failed to read body: {e}")))?;
        debug!(bytes = body.len(), url = %self.url, "Fetched service status");

        parse_service_status(&body)
    }
}
