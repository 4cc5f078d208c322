//! Core error types for workhealth-core.
//!
//! The scoring functions themselves never fail. Errors exist only at the
//! edges: malformed provider events, the upstream calendar fetch, the
//! insight generator, the cache, and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for workhealth-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The calendar provider could not be reached or returned garbage.
    #[error("Upstream fetch error: {0}")]
    Upstream(#[from] UpstreamFetchError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Cache store could not be opened or read
    #[error("Cache error: {0}")]
    Cache(#[from] CacheReadError),

    /// Cache write failed
    #[error("Cache write failed: {0}")]
    CacheWrite(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

impl CoreError {
    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Upstream(e) if e.is_retryable())
    }
}

/// A single provider event that cannot take part in scoring.
///
/// The normalizer logs these and moves on; they never abort an analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidEventError {
    /// No concrete `dateTime` on start or end (all-day or incomplete event).
    #[error("event '{id}' has no concrete start/end instant")]
    MissingTimestamps { id: String },

    /// A timestamp that is not valid RFC 3339.
    #[error("event '{id}' has an unparseable timestamp '{value}'")]
    UnparseableTimestamp { id: String, value: String },

    /// End at or before start.
    #[error("event '{id}' has a non-positive duration of {minutes} minutes")]
    NonPositiveDuration { id: String, minutes: i64 },
}

/// Failure to obtain the raw event list from the calendar provider.
#[derive(Error, Debug)]
pub enum UpstreamFetchError {
    /// No access token configured for the live source.
    #[error("not authenticated with the calendar provider")]
    Unauthenticated,

    /// Transport-level failure.
    #[error("request to calendar provider failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with an error payload or status.
    #[error("calendar provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Provider answered with a body we cannot read.
    #[error("calendar provider returned a malformed response: {0}")]
    MalformedResponse(String),

    /// The requested timezone is not a known IANA zone.
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    /// The configured provider URL cannot be used.
    #[error("invalid calendar provider URL: {0}")]
    InvalidUrl(String),
}

impl UpstreamFetchError {
    /// Transport failures and 5xx/429 answers are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamFetchError::Http(_) => true,
            UpstreamFetchError::Api { status, .. } => *status == 429 || *status >= 500,
            UpstreamFetchError::Unauthenticated
            | UpstreamFetchError::MalformedResponse(_)
            | UpstreamFetchError::UnknownTimezone(_)
            | UpstreamFetchError::InvalidUrl(_) => false,
        }
    }
}

/// Failure inside the external insight generator.
///
/// Caught at the service boundary and replaced with fallback insights.
#[derive(Error, Debug)]
pub enum InsightGenerationError {
    /// No endpoint configured.
    #[error("insight generator is not configured")]
    NotConfigured,

    /// The generator did not answer in time.
    #[error("insight generator timed out after {0} seconds")]
    Timeout(u64),

    /// Transport-level failure.
    #[error("insight generator request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the generator.
    #[error("insight generator returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The answer did not have the expected shape.
    #[error("insight generator returned a malformed response: {0}")]
    Malformed(String),
}

/// A cached entry that cannot be read back. Treated as a cache miss.
#[derive(Error, Debug)]
pub enum CacheReadError {
    /// The backing store failed.
    #[error("cache storage failed: {0}")]
    Storage(String),

    /// The stored payload could not be decoded.
    #[error("cached entry for '{user_id}/{tab}' is corrupt: {message}")]
    Corrupt {
        user_id: String,
        tab: String,
        message: String,
    },
}

impl From<rusqlite::Error> for CacheReadError {
    fn from(err: rusqlite::Error) -> Self {
        CacheReadError::Storage(err.to_string())
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// No usable data directory
    #[error("Cannot determine data directory: {0}")]
    DataDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_retryability() {
        assert!(!UpstreamFetchError::Unauthenticated.is_retryable());
        assert!(UpstreamFetchError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(UpstreamFetchError::Api {
            status: 429,
            message: "rate limited".into()
        }
        .is_retryable());
        assert!(!UpstreamFetchError::Api {
            status: 404,
            message: "not found".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_core_error_retryable_only_for_upstream() {
        let err: CoreError = UpstreamFetchError::Api {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(err.is_retryable());
        assert!(!CoreError::Custom("x".into()).is_retryable());
    }

    #[test]
    fn test_invalid_event_messages() {
        let err = InvalidEventError::NonPositiveDuration {
            id: "evt-1".into(),
            minutes: 0,
        };
        assert_eq!(
            err.to_string(),
            "event 'evt-1' has a non-positive duration of 0 minutes"
        );
    }
}
