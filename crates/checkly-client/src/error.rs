//! Checkly client errors

use thiserror::Error;

/// Errors that can occur when interacting with the Checkly API
#[derive(Debug, Error)]
pub enum ChecklyError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Checkly API returned an error
    #[error("Checkly API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid API key or account ID)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ChecklyError {
    /// Whether the error means the addressed resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChecklyError::NotFound(_))
    }
}
