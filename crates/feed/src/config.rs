//! Configuration for the feed client and poller.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use transit_core::{Error, Result};

use crate::retry::RetryPolicy;

/// Public service-status endpoint for the subway.
pub const DEFAULT_FEED_URL: &str = "http://web.mta.info/status/ServiceStatusSubway.xml";

/// Configuration for fetching and polling the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Service-status document URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// Time between polls.
    #[serde(with = "duration_secs", default = "default_poll_interval")]
    pub poll_interval: Duration,

    /// Timeout for a single fetch.
    #[serde(with = "duration_secs", default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// Retries for the startup snapshot before giving up.
    #[serde(default = "default_bootstrap_retries")]
    pub bootstrap_retries: u32,

    /// Base backoff between startup retries, in milliseconds.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Cap on the startup backoff, in milliseconds.
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            poll_interval: default_poll_interval(),
            request_timeout: default_request_timeout(),
            bootstrap_retries: default_bootstrap_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl FeedConfig {
    /// Set the feed URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the fetch timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Apply `TRANSIT_*` environment overrides.
    #[must_use]
    pub fn merge_env(mut self) -> Self {
        if let Ok(url) = std::env::var("TRANSIT_FEED_URL") {
            self.url = url;
        }

        if let Some(secs) = env_u64("TRANSIT_POLL_INTERVAL_SECS") {
            self.poll_interval = Duration::from_secs(secs);
        }

        if let Some(secs) = env_u64("TRANSIT_REQUEST_TIMEOUT_SECS") {
            self.request_timeout = Duration::from_secs(secs);
        }

        if let Some(retries) = env_u32("TRANSIT_BOOTSTRAP_RETRIES") {
            self.bootstrap_retries = retries;
        }

        self
    }

    /// Check the values are usable.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for an empty URL or a zero interval or
    /// timeout.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::invalid_config("feed url must not be empty"));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::invalid_config("poll interval must be positive"));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::invalid_config("request timeout must be positive"));
        }
        Ok(())
    }

    /// Backoff policy for the startup snapshot.
    #[must_use]
    pub fn bootstrap_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.bootstrap_retries,
            self.retry_base_delay_ms,
            self.retry_max_delay_ms,
        )
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_u64(key).and_then(|value| u32::try_from(value).ok())
}

fn default_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

const fn default_poll_interval() -> Duration {
    Duration::from_secs(60)
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(15)
}

const fn default_bootstrap_retries() -> u32 {
    5
}

const fn default_retry_base_delay_ms() -> u64 {
    500
}

const fn default_retry_max_delay_ms() -> u64 {
    30_000
}

/// Serialization helper for Duration as seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
