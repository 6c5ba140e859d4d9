//! Error types for the modsync engine.
//!
//! Errors below the update-handler boundary are absorbed and logged; only the
//! persistence and settings paths surface them to callers.

use crate::config::NetworkConfig;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the modsync engine.
#[derive(Debug, Error)]
pub enum ModSyncError {
    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Rate limited by {service}, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        service: String,
        retry_after_secs: Option<u64>,
    },

    #[error("{service} API error: {message}")]
    Api {
        service: String,
        message: String,
        status_code: Option<u16>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The top-level token of a cache document was malformed.
    #[error("Failed to decode {what}: {message}")]
    Decode { what: String, message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Operation cancelled")]
    Cancelled,

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for modsync operations.
pub type Result<T> = std::result::Result<T, ModSyncError>;

impl From<std::io::Error> for ModSyncError {
    fn from(err: std::io::Error) -> Self {
        ModSyncError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ModSyncError {
    fn from(err: serde_json::Error) -> Self {
        ModSyncError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Timeouts carry the configured request timeout; every [`HttpClient`]
/// built without an explicit timeout uses it.
///
/// [`HttpClient`]: crate::network::HttpClient
impl From<reqwest::Error> for ModSyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModSyncError::Timeout(NetworkConfig::REQUEST_TIMEOUT)
        } else {
            ModSyncError::Network {
                message: err.to_string(),
                cause: err.url().map(|u| u.to_string()),
            }
        }
    }
}

impl ModSyncError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ModSyncError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a decode error for a malformed document.
    pub fn decode(what: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ModSyncError::Decode {
            what: what.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error is the result of a cancellation request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ModSyncError::Cancelled)
    }

    /// Whether the failure came from talking to a remote service.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ModSyncError::Network { .. }
                | ModSyncError::Timeout(_)
                | ModSyncError::RateLimited { .. }
                | ModSyncError::Api { .. }
        )
    }
}
