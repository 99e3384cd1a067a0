//! Error types for the type synchronization system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for typesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the type synchronization system
#[derive(Error, Debug)]
pub enum Error {
    /// The spec source was unreachable or returned a non-success response.
    ///
    /// Recoverable: the run fails and the next trigger may succeed.
    #[error("Fetch error: {message}")]
    Fetch {
        /// Underlying error message
        message: String,
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Response body, if a response was received (truncated)
        body: Option<String>,
    },

    /// The external type generator reported failure.
    ///
    /// Recoverable: the run fails and the next trigger may succeed.
    #[error("Generation error: {message}")]
    Generation {
        /// Underlying error message
        message: String,
        /// Captured stderr from the generator process, if any
        stderr: Option<String>,
    },

    /// The listener failed to bind for a reason other than address-in-use.
    ///
    /// Fatal at startup.
    #[error("Bootstrap error: {0}")]
    Bootstrap(String),

    /// Configuration file missing or failed validation.
    ///
    /// Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a fetch error with no captured response
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch {
            message: msg.into(),
            status: None,
            body: None,
        }
    }

    /// Create a fetch error carrying the response status and body
    pub fn fetch_response(msg: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Fetch {
            message: msg.into(),
            status: Some(status),
            body: Some(body.into()),
        }
    }

    /// Create a generation error with no captured stderr
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation {
            message: msg.into(),
            stderr: None,
        }
    }

    /// Create a generation error carrying the generator's stderr
    pub fn generation_with_stderr(msg: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Generation {
            message: msg.into(),
            stderr: Some(stderr.into()),
        }
    }

    /// Create a bootstrap error
    pub fn bootstrap(msg: impl Into<String>) -> Self {
        Self::Bootstrap(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether this error class terminates the process at startup
    ///
    /// Pipeline-level errors (fetch, generation) are recoverable and never
    /// escape the coordinator; bootstrap and configuration errors have no
    /// useful degraded mode.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Bootstrap(_) | Self::Config(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
