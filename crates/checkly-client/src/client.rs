//! Checkly API client
//!
//! Implements the alert channel endpoints of the Checkly public API:
//! `/v1/alert-channels` and `/v1/alert-channels/{id}`.

use crate::checkly_trait::ChecklyClientTrait;
use crate::common::HttpClient;
use crate::error::ChecklyError;
use crate::models::*;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Checkly API client
pub struct ChecklyClient {
    http: HttpClient,
}

impl ChecklyClient {
    /// Create a new Checkly client
    ///
    /// # Arguments
    /// * `base_url` - Checkly API base URL (e.g., "https://api.checklyhq.com")
    /// * `api_key` - User API key, sent as a bearer token
    /// * `account_id` - Account the key operates on, sent as `X-Checkly-Account`
    pub fn new(base_url: String, api_key: String, account_id: String) -> Result<Self, ChecklyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http: HttpClient::new(client, base_url, api_key, account_id),
        })
    }
}

#[async_trait::async_trait]
impl ChecklyClientTrait for ChecklyClient {
    fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Validate the API key and account by listing at most one alert channel.
    async fn validate_token(&self) -> Result<(), ChecklyError> {
        debug!("Validating Checkly API key and connectivity");
        let _: Value = self.http.get("/v1/alert-channels?limit=1").await?;
        debug!("API key validated successfully");
        Ok(())
    }

    async fn get_alert_channel(&self, id: i64) -> Result<AlertChannel, ChecklyError> {
        self.http.get(&format!("/v1/alert-channels/{}", id)).await
    }

    async fn create_alert_channel(&self, request: &AlertChannelRequest) -> Result<AlertChannel, ChecklyError> {
        debug!(channel_type = request.config.channel_type(), "Creating alert channel");
        self.http.post("/v1/alert-channels", request).await
    }

    async fn update_alert_channel(&self, id: i64, request: &AlertChannelRequest) -> Result<AlertChannel, ChecklyError> {
        debug!(id, channel_type = request.config.channel_type(), "Updating alert channel");
        self.http.put(&format!("/v1/alert-channels/{}", id), request).await
    }

    async fn delete_alert_channel(&self, id: i64) -> Result<(), ChecklyError> {
        debug!(id, "Deleting alert channel");
        self.http.delete(&format!("/v1/alert-channels/{}", id)).await
    }
}
