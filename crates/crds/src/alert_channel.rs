//! AlertChannel Custom Resource Definition
//!
//! Defines a Kubernetes CRD for managing Checkly alert channels. Exactly one provider
//! block (`email`, `opsgenie` or `webhook`) describes where alerts are delivered.

use crate::references::{KeyValue, SecretKeyReference};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// AlertChannelSpec defines the desired state of a Checkly alert channel
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.checklyhq.com",
    version = "v1alpha1",
    kind = "AlertChannel",
    namespaced,
    status = "AlertChannelStatus",
    shortname = "ac",
    printcolumn = r#"{"name":"Remote ID", "type":"integer", "jsonPath":".status.remoteId"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct AlertChannelSpec {
    /// Send a notification when a check recovers
    #[serde(default = "default_true")]
    pub send_recovery: bool,

    /// Send a notification when a check fails
    #[serde(default = "default_true")]
    pub send_failure: bool,

    /// Send a notification when a check degrades
    #[serde(default)]
    pub send_degraded: bool,

    /// Send a notification when an SSL certificate is about to expire
    #[serde(default)]
    pub ssl_expiry: bool,

    /// Days before SSL expiry to notify (1-30, only used when `sslExpiry` is set)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1, max = 30))]
    pub ssl_expiry_threshold: Option<i32>,

    /// Email delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailChannel>,

    /// OpsGenie delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opsgenie: Option<OpsgenieChannel>,

    /// Webhook delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookChannel>,
}

fn default_true() -> bool {
    true
}

/// Days accepted for `sslExpiryThreshold`
pub const SSL_EXPIRY_THRESHOLD_DAYS: std::ops::RangeInclusive<i32> = 1..=30;

impl Default for AlertChannelSpec {
    fn default() -> Self {
        Self {
            send_recovery: default_true(),
            send_failure: default_true(),
            send_degraded: false,
            ssl_expiry: false,
            ssl_expiry_threshold: None,
            email: None,
            opsgenie: None,
            webhook: None,
        }
    }
}

/// Email alert channel configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmailChannel {
    /// Address alerts are sent to
    pub address: String,
}

/// OpsGenie alert channel configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpsgenieChannel {
    /// Secret field holding the OpsGenie API key
    pub api_secret: SecretKeyReference,

    /// OpsGenie region ("EU" or "US")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Alert priority ("P1" to "P5")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// Webhook alert channel configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WebhookChannel {
    /// Channel name in Checkly (defaults to the AlertChannel name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Target URL
    pub url: String,

    /// Webhook flavour, e.g. "WEBHOOK_GENERIC" or "WEBHOOK_MSTEAMS"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_type: Option<String>,

    /// HTTP method used to call the webhook
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Request body template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Secret field holding the webhook signing secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<SecretKeyReference>,

    /// Extra request headers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<KeyValue>,

    /// Extra query parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query_parameters: Vec<KeyValue>,
}

/// AlertChannelStatus defines the observed state of a Checkly alert channel
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AlertChannelStatus {
    /// Checkly alert channel ID (set after creation, 0 or absent means not created)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<i64>,
}

/// The provider block selected by an AlertChannelSpec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelProvider<'a> {
    /// Deliver by email
    Email(&'a EmailChannel),
    /// Deliver to OpsGenie
    Opsgenie(&'a OpsgenieChannel),
    /// Deliver to a webhook
    Webhook(&'a WebhookChannel),
}

impl ChannelProvider<'_> {
    /// Provider name as used in spec field names
    pub fn kind(&self) -> &'static str {
        match self {
            ChannelProvider::Email(_) => "email",
            ChannelProvider::Opsgenie(_) => "opsgenie",
            ChannelProvider::Webhook(_) => "webhook",
        }
    }
}

/// Errors in an AlertChannelSpec that no amount of retrying will fix
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    /// None of email, opsgenie or webhook is set
    #[error("one of email, opsgenie or webhook must be set")]
    NoProvider,

    /// More than one provider block is set
    #[error("only one of email, opsgenie or webhook may be set, found: {}", .0.join(", "))]
    MultipleProviders(Vec<&'static str>),

    /// `sslExpiryThreshold` is outside 1..=30 days
    #[error("sslExpiryThreshold must be between 1 and 30 days, got {0}")]
    SslExpiryThresholdOutOfRange(i32),
}

impl AlertChannelSpec {
    /// Select the single configured provider
    pub fn provider(&self) -> Result<ChannelProvider<'_>, SpecError> {
        let mut providers = Vec::with_capacity(1);
        if let Some(email) = &self.email {
            providers.push(ChannelProvider::Email(email));
        }
        if let Some(opsgenie) = &self.opsgenie {
            providers.push(ChannelProvider::Opsgenie(opsgenie));
        }
        if let Some(webhook) = &self.webhook {
            providers.push(ChannelProvider::Webhook(webhook));
        }

        match providers.as_slice() {
            [] => Err(SpecError::NoProvider),
            [provider] => Ok(*provider),
            many => Err(SpecError::MultipleProviders(
                many.iter().map(ChannelProvider::kind).collect(),
            )),
        }
    }
}

impl AlertChannelSpec {
    /// The SSL expiry threshold to send, if SSL expiry alerts are enabled
    pub fn effective_ssl_expiry_threshold(&self) -> Result<Option<i32>, SpecError> {
        match self.ssl_expiry_threshold.filter(|_| self.ssl_expiry) {
            Some(days) if !SSL_EXPIRY_THRESHOLD_DAYS.contains(&days) => {
                Err(SpecError::SslExpiryThresholdOutOfRange(days))
            }
            threshold => Ok(threshold),
        }
    }
}

impl AlertChannel {
    /// The Checkly ID recorded in status, if the channel was ever created upstream
    pub fn remote_id(&self) -> Option<i64> {
        self.status
            .as_ref()
            .and_then(|s| s.remote_id)
            .filter(|id| *id != 0)
    }

    /// Whether the object carries the given finalizer
    pub fn has_finalizer(&self, finalizer: &str) -> bool {
        self.metadata
            .finalizers
            .as_ref()
            .is_some_and(|f| f.iter().any(|s| s == finalizer))
    }

    /// Whether the object has been marked for deletion
    pub fn is_being_deleted(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }
}
