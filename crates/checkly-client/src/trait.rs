//! ChecklyClient trait for mocking
//!
//! This trait abstracts the ChecklyClient so the reconciler can be driven by a mock in
//! unit tests. The concrete ChecklyClient implements it against the REST API.

use crate::error::ChecklyError;
use crate::models::*;

/// Trait for Checkly API client operations
///
/// Each call is a single request/response with no retries underneath.
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ChecklyClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Validate the API key and account ID
    async fn validate_token(&self) -> Result<(), ChecklyError>;

    // Alert channel operations
    async fn get_alert_channel(&self, id: i64) -> Result<AlertChannel, ChecklyError>;
    async fn create_alert_channel(&self, request: &AlertChannelRequest) -> Result<AlertChannel, ChecklyError>;
    async fn update_alert_channel(&self, id: i64, request: &AlertChannelRequest) -> Result<AlertChannel, ChecklyError>;
    async fn delete_alert_channel(&self, id: i64) -> Result<(), ChecklyError>;
}
