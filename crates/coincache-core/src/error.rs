//! Error types for the coincache library.
//!
//! The refresh path distinguishes failures that degrade to serving the
//! last-known-good snapshot (upstream, persist) from failures that must
//! surface to the caller (lookup errors, nothing cached at all).

use std::time::Duration;
use thiserror::Error;

/// Main error type for coincache operations.
#[derive(Debug, Error)]
pub enum CoincacheError {
    // Upstream errors
    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// The human name could not be resolved, or nothing is persisted for it.
    #[error("Coin not found: {name}")]
    CoinNotFound { name: String },

    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for coincache operations.
pub type Result<T> = std::result::Result<T, CoincacheError>;

// Conversion implementations for common error types

impl From<reqwest::Error> for CoincacheError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CoincacheError::Timeout(crate::config::NetworkConfig::REQUEST_TIMEOUT)
        } else {
            CoincacheError::Upstream {
                message: err.to_string(),
                source: Some(err),
            }
        }
    }
}

impl From<rusqlite::Error> for CoincacheError {
    fn from(err: rusqlite::Error) -> Self {
        CoincacheError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for CoincacheError {
    fn from(err: serde_json::Error) -> Self {
        CoincacheError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl CoincacheError {
    /// Whether this failure may be absorbed inside the refresh branch and
    /// degraded to serving a previously persisted snapshot.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            CoincacheError::Upstream { .. }
                | CoincacheError::Timeout(_)
                | CoincacheError::CoinNotFound { .. }
                | CoincacheError::Database { .. }
        )
    }

    /// Map to the HTTP status code used by the transport layer.
    pub fn to_status_code(&self) -> u16 {
        match self {
            CoincacheError::CoinNotFound { .. } => 404,
            CoincacheError::Config { .. } => 400,
            _ => 500,
        }
    }
}
