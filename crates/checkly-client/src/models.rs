//! Checkly API models
//!
//! Request and response bodies for the `/v1/alert-channels` endpoints.
//! See: https://developers.checklyhq.com/reference/postv1alertchannels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert channel as returned by the Checkly API
///
/// Only `id` is required; the remaining fields are informational and tolerate
/// whatever shape the API returns for each channel type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertChannel {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub channel_type: String,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub send_recovery: Option<bool>,
    #[serde(default)]
    pub send_failure: Option<bool>,
    #[serde(default)]
    pub send_degraded: Option<bool>,
    #[serde(default)]
    pub ssl_expiry: Option<bool>,
    #[serde(default)]
    pub ssl_expiry_threshold: Option<i32>,
    #[serde(rename = "created_at", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updated_at", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating an alert channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertChannelRequest {
    #[serde(flatten)]
    pub config: AlertChannelConfig,
    pub send_recovery: bool,
    pub send_failure: bool,
    pub send_degraded: bool,
    pub ssl_expiry: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_expiry_threshold: Option<i32>,
}

/// Provider-specific alert channel configuration
///
/// Serialized as `{"type": "WEBHOOK", "config": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "config", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertChannelConfig {
    Email(EmailConfig),
    Opsgenie(OpsgenieConfig),
    Webhook(WebhookConfig),
}

impl AlertChannelConfig {
    /// The Checkly channel type string
    pub fn channel_type(&self) -> &'static str {
        match self {
            AlertChannelConfig::Email(_) => "EMAIL",
            AlertChannelConfig::Opsgenie(_) => "OPSGENIE",
            AlertChannelConfig::Webhook(_) => "WEBHOOK",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmailConfig {
    pub address: String,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpsgenieConfig {
    pub name: String,
    pub api_key: String,
    pub region: String,
    pub priority: String,
}

impl fmt::Debug for OpsgenieConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpsgenieConfig")
            .field("name", &self.name)
            .field("api_key", &"<redacted>")
            .field("region", &self.region)
            .field("priority", &self.priority)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    pub name: String,
    pub url: String,
    pub webhook_type: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    #[serde(default)]
    pub query_parameters: Vec<KeyValue>,
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("webhook_type", &self.webhook_type)
            .field("method", &self.method)
            .field("template", &self.template)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("headers", &self.headers)
            .field("query_parameters", &self.query_parameters)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct KeyValue {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub locked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_type_and_config() {
        let request = AlertChannelRequest {
            config: AlertChannelConfig::Email(EmailConfig {
                address: "oncall@example.com".to_string(),
            }),
            send_recovery: true,
            send_failure: true,
            send_degraded: false,
            ssl_expiry: false,
            ssl_expiry_threshold: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], "EMAIL");
        assert_eq!(value["config"]["address"], "oncall@example.com");
        assert_eq!(value["sendRecovery"], true);
        assert!(value.get("sslExpiryThreshold").is_none());
    }

    #[test]
    fn test_opsgenie_type_name() {
        let config = AlertChannelConfig::Opsgenie(OpsgenieConfig {
            name: "ops".to_string(),
            api_key: "key".to_string(),
            region: "EU".to_string(),
            priority: "P3".to_string(),
        });
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["type"], "OPSGENIE");
        assert_eq!(value["config"]["apiKey"], "key");
        assert_eq!(config.channel_type(), "OPSGENIE");
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let opsgenie = OpsgenieConfig {
            name: "ops".to_string(),
            api_key: "super-secret".to_string(),
            region: "EU".to_string(),
            priority: "P3".to_string(),
        };
        assert!(!format!("{:?}", opsgenie).contains("super-secret"));

        let webhook = WebhookConfig {
            webhook_secret: Some("hmac-key".to_string()),
            ..Default::default()
        };
        assert!(!format!("{:?}", webhook).contains("hmac-key"));
    }

    #[test]
    fn test_response_tolerates_unknown_config() {
        let channel: AlertChannel = serde_json::from_value(serde_json::json!({
            "id": 42,
            "type": "WEBHOOK",
            "config": { "url": "https://example.com", "somethingNew": 1 },
            "sendRecovery": true,
            "created_at": "2024-01-02T03:04:05.000Z"
        }))
        .unwrap();
        assert_eq!(channel.id, 42);
        assert_eq!(channel.channel_type, "WEBHOOK");
        assert!(channel.created_at.is_some());
        assert_eq!(channel.send_failure, None);
    }
}
