//! Controller-specific error types.
//!
//! This module defines error types specific to the AlertChannel controller
//! that are not covered by upstream library errors.

use checkly_client::ChecklyError;
use crds::SpecError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the AlertChannel controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Checkly API error
    #[error("Checkly error: {0}")]
    Checkly(#[from] ChecklyError),

    /// Referenced Secret, or the referenced field inside it, is missing or empty
    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    /// Optimistic concurrency conflict while persisting an object
    #[error("Conflict: {0}")]
    Conflict(String),

    /// AlertChannel spec cannot be turned into a Checkly payload
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),

    /// Controller settings could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<SpecError> for ControllerError {
    fn from(err: SpecError) -> Self {
        ControllerError::InvalidConfig(err.to_string())
    }
}

impl ControllerError {
    /// Stable label for the `error` dimension of error metrics
    pub fn metric_label(&self) -> &'static str {
        match self {
            ControllerError::Kube(_) => "kube",
            ControllerError::Checkly(_) => "checkly",
            ControllerError::SecretNotFound(_) => "secret_not_found",
            ControllerError::Conflict(_) => "conflict",
            ControllerError::InvalidConfig(_) => "invalid_config",
            ControllerError::Serialization(_) => "serialization",
            ControllerError::Watch(_) => "watch",
            ControllerError::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_error_becomes_invalid_config() {
        let err: ControllerError = SpecError::NoProvider.into();
        assert!(matches!(err, ControllerError::InvalidConfig(_)));
        assert_eq!(err.metric_label(), "invalid_config");
    }

    #[test]
    fn test_checkly_error_label() {
        let err: ControllerError = ChecklyError::Api("boom".to_string()).into();
        assert_eq!(err.metric_label(), "checkly");
        assert!(err.to_string().contains("boom"));
    }
}
