//! Service configuration.
//!
//! Precedence, lowest first: built-in defaults, the TOML file, `TRANSIT_*`
//! environment variables, CLI flags.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use transit_core::{Error, Result};
use transit_feed::FeedConfig;
use transit_web::ServerConfig;

use crate::cli::Cli;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub feed: FeedConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_config(format!("failed to read {}: {e}", path.display()))
        })?;

        toml::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Defaults or `path`, then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `path` is given and unusable.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.merge_env())
    }

    /// Apply `TRANSIT_*` environment overrides.
    #[must_use]
    pub fn merge_env(mut self) -> Self {
        if let Ok(bind) = std::env::var("TRANSIT_BIND_ADDRESS") {
            self.server.bind_address = bind;
        }
        self.feed = self.feed.merge_env();
        self
    }

    /// Apply CLI flags, which win over everything else.
    #[must_use]
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(bind) = &cli.bind {
            self.server.bind_address.clone_from(bind);
        }
        if let Some(url) = &cli.feed_url {
            self.feed.url.clone_from(url);
        }
        if let Some(secs) = cli.interval_secs {
            self.feed.poll_interval = Duration::from_secs(secs);
        }
        self
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for the first unusable value.
    pub fn validate(&self) -> Result<()> {
        self.server.socket_addr()?;
        self.feed.validate()
    }
}
