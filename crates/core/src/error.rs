//! Core error types for transit-uptime operations.
//!
//! All errors are explicit, typed, and recoverable - no panics allowed.

use thiserror::Error;

/// Core error type shared by every transit-uptime crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    // Validation errors
    #[error("unknown line '{code}'")]
    UnknownLine { code: String },

    // Lifecycle errors
    #[error("{component} is not initialized")]
    NotInitialized { component: &'static str },

    #[error("{component} is already initialized")]
    AlreadyInitialized { component: &'static str },

    #[error("uptime is undefined after {elapsed_secs}s of elapsed time")]
    UptimeUndefined { elapsed_secs: f64 },

    // Feed errors
    #[error("failed to fetch service status: {reason}")]
    FetchFailed { reason: String },

    #[error("failed to parse service status: {reason}")]
    FeedParseFailed { reason: String },

    // Configuration
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Create an unknown line error.
    pub fn unknown_line(code: impl Into<String>) -> Self {
        Self::UnknownLine { code: code.into() }
    }

    /// Create a not initialized error.
    #[must_use]
    pub const fn not_initialized(component: &'static str) -> Self {
        Self::NotInitialized { component }
    }

    /// Create an already initialized error.
    #[must_use]
    pub const fn already_initialized(component: &'static str) -> Self {
        Self::AlreadyInitialized { component }
    }

    /// Create a fetch failed error.
    pub fn fetch_failed(reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            reason: reason.into(),
        }
    }

    /// Create a feed parse error.
    pub fn feed_parse_failed(reason: impl Into<String>) -> Self {
        Self::FeedParseFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid config error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Whether the error is a transient upstream failure that the next poll retries.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. } | Self::FeedParseFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_line_display() {
        let err = Error::unknown_line("X");
        assert_eq!(err.to_string(), "unknown line 'X'");
    }

    #[test]
    fn test_lifecycle_display() {
        assert!(
            Error::not_initialized("delay state store")
                .to_string()
                .contains("not initialized")
        );
        assert!(
            Error::already_initialized("process clock")
                .to_string()
                .contains("process clock")
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::fetch_failed("timeout").is_transient());
        assert!(Error::feed_parse_failed("eof").is_transient());
        assert!(!Error::unknown_line("X").is_transient());
        assert!(!Error::not_initialized("store").is_transient());
    }
}
