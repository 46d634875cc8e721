//! Error types for StoreIt.

use thiserror::Error;

/// Common error type for StoreIt.
#[derive(Error, Debug)]
pub enum StoreItError {
    /// No session, or the backend rejected the session.
    #[error("not authenticated: {0}")]
    Unauthenticated(String),

    /// Referenced user or file is absent.
    #[error("{0} not found")]
    NotFound(String),

    /// The backend service answered with an error.
    ///
    /// `status` is the HTTP status reported by the service; the memory
    /// backend uses the same codes so callers can branch on them uniformly.
    #[error("backend service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// The backend service could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A payload could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreItError {
    /// Shorthand for a service error.
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        StoreItError::Service {
            status,
            message: message.into(),
        }
    }

    /// HTTP status reported by the backend, if this is a service error.
    pub fn service_status(&self) -> Option<u16> {
        match self {
            StoreItError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StoreItError {
    fn from(e: reqwest::Error) -> Self {
        StoreItError::Transport(e.to_string())
    }
}

/// Result type alias for StoreIt operations.
pub type Result<T> = std::result::Result<T, StoreItError>;
