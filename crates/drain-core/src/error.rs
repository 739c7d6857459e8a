//! Error types for the drain/undrain engine
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for drain operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the drain/undrain engine
#[derive(Error, Debug)]
pub enum Error {
    /// DNS provider-related errors (listing or change creation failed)
    #[error("DNS provider error: {0}")]
    Provider(String),

    /// Changelog persistence errors
    #[error("changelog error: {0}")]
    Changelog(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid input (bad pattern, bad replacement value)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Not all zone tasks reported completion within the wait window
    #[error("timeout exceeded: {pending} zone task(s) still pending after {window_secs}s")]
    Timeout {
        /// Number of zone tasks that had not completed
        pending: usize,
        /// Configured wait window in seconds
        window_secs: u64,
    },

    /// I/O errors (changelog file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication errors
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Record not found
    #[error("record not found: {0}")]
    NotFound(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a DNS provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a changelog error
    pub fn changelog(msg: impl Into<String>) -> Self {
        Self::Changelog(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
