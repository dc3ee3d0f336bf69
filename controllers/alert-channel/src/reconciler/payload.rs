//! Assembly of Checkly request payloads from AlertChannel specs.
//!
//! Each provider variant resolves its own Secret references and produces a flat
//! `AlertChannelConfig`; the channel-wide notification flags are added on top.

use crate::error::ControllerError;
use crate::secrets::{resolve_secret_value, SecretStore};
use checkly_client::{
    AlertChannelConfig, AlertChannelRequest, EmailConfig, KeyValue, OpsgenieConfig, WebhookConfig,
};
use crds::{AlertChannelSpec, ChannelProvider};

const DEFAULT_OPSGENIE_REGION: &str = "EU";
const DEFAULT_OPSGENIE_PRIORITY: &str = "P3";
const DEFAULT_WEBHOOK_TYPE: &str = "WEBHOOK_GENERIC";
const DEFAULT_WEBHOOK_METHOD: &str = "POST";

/// Turn a provider variant into a Checkly config, resolving referenced Secrets
#[async_trait::async_trait]
pub trait ResolveConfig {
    async fn resolve(
        &self,
        secrets: &dyn SecretStore,
        namespace: &str,
        channel_name: &str,
    ) -> Result<AlertChannelConfig, ControllerError>;
}

#[async_trait::async_trait]
impl ResolveConfig for ChannelProvider<'_> {
    async fn resolve(
        &self,
        secrets: &dyn SecretStore,
        namespace: &str,
        channel_name: &str,
    ) -> Result<AlertChannelConfig, ControllerError> {
        Ok(match *self {
            ChannelProvider::Email(email) => AlertChannelConfig::Email(EmailConfig {
                address: email.address.clone(),
            }),
            ChannelProvider::Opsgenie(opsgenie) => {
                let api_key = resolve_secret_value(secrets, &opsgenie.api_secret, namespace).await?;
                AlertChannelConfig::Opsgenie(OpsgenieConfig {
                    name: channel_name.to_string(),
                    api_key,
                    region: opsgenie
                        .region
                        .clone()
                        .unwrap_or_else(|| DEFAULT_OPSGENIE_REGION.to_string()),
                    priority: opsgenie
                        .priority
                        .clone()
                        .unwrap_or_else(|| DEFAULT_OPSGENIE_PRIORITY.to_string()),
                })
            }
            ChannelProvider::Webhook(webhook) => {
                let webhook_secret = match &webhook.webhook_secret {
                    Some(reference) => Some(resolve_secret_value(secrets, reference, namespace).await?),
                    None => None,
                };
                AlertChannelConfig::Webhook(WebhookConfig {
                    name: webhook
                        .name
                        .clone()
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| channel_name.to_string()),
                    url: webhook.url.clone(),
                    webhook_type: webhook
                        .webhook_type
                        .clone()
                        .unwrap_or_else(|| DEFAULT_WEBHOOK_TYPE.to_string()),
                    method: webhook
                        .method
                        .clone()
                        .unwrap_or_else(|| DEFAULT_WEBHOOK_METHOD.to_string()),
                    template: webhook.template.clone(),
                    webhook_secret,
                    headers: webhook.headers.iter().map(to_key_value).collect(),
                    query_parameters: webhook.query_parameters.iter().map(to_key_value).collect(),
                })
            }
        })
    }
}

fn to_key_value(kv: &crds::KeyValue) -> KeyValue {
    KeyValue {
        key: kv.key.clone(),
        value: kv.value.clone(),
        locked: kv.locked,
    }
}

/// Build the full create/update body for an AlertChannel
pub async fn build_request(
    spec: &AlertChannelSpec,
    secrets: &dyn SecretStore,
    namespace: &str,
    channel_name: &str,
) -> Result<AlertChannelRequest, ControllerError> {
    let ssl_expiry_threshold = spec.effective_ssl_expiry_threshold()?;
    let config = spec.provider()?.resolve(secrets, namespace, channel_name).await?;

    Ok(AlertChannelRequest {
        config,
        send_recovery: spec.send_recovery,
        send_failure: spec.send_failure,
        send_degraded: spec.send_degraded,
        ssl_expiry: spec.ssl_expiry,
        ssl_expiry_threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_secret, InMemorySecretStore};
    use crds::{EmailChannel, OpsgenieChannel, SecretKeyReference, WebhookChannel};

    #[tokio::test]
    async fn test_opsgenie_uses_object_name_and_defaults() {
        let secrets = InMemorySecretStore::default();
        secrets.insert(create_test_secret("default", "opsgenie", &[("apiKey", "og-key")]));
        let spec = AlertChannelSpec {
            opsgenie: Some(OpsgenieChannel {
                api_secret: SecretKeyReference::new("opsgenie", "apiKey"),
                region: None,
                priority: Some("P1".to_string()),
            }),
            ..Default::default()
        };

        let request = build_request(&spec, &secrets, "default", "ops-pager").await.unwrap();
        match request.config {
            AlertChannelConfig::Opsgenie(config) => {
                assert_eq!(config.name, "ops-pager");
                assert_eq!(config.api_key, "og-key");
                assert_eq!(config.region, "EU");
                assert_eq!(config.priority, "P1");
            }
            other => panic!("expected opsgenie config, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_webhook_resolves_secret_and_copies_fields() {
        let secrets = InMemorySecretStore::default();
        secrets.insert(create_test_secret("team-a", "hook", &[("signing", "hmac")]));
        let spec = AlertChannelSpec {
            webhook: Some(WebhookChannel {
                url: "https://hooks.example.com/alert".to_string(),
                method: Some("PUT".to_string()),
                template: Some("{\"msg\":\"{{ALERT_TITLE}}\"}".to_string()),
                webhook_secret: Some(SecretKeyReference::new("hook", "signing")),
                headers: vec![crds::KeyValue {
                    key: "X-Team".to_string(),
                    value: "sre".to_string(),
                    locked: true,
                }],
                ..Default::default()
            }),
            ..Default::default()
        };

        let request = build_request(&spec, &secrets, "team-a", "hook-channel").await.unwrap();
        match request.config {
            AlertChannelConfig::Webhook(config) => {
                assert_eq!(config.name, "hook-channel");
                assert_eq!(config.webhook_type, "WEBHOOK_GENERIC");
                assert_eq!(config.method, "PUT");
                assert_eq!(config.webhook_secret.as_deref(), Some("hmac"));
                assert_eq!(config.headers.len(), 1);
                assert!(config.headers[0].locked);
            }
            other => panic!("expected webhook config, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_webhook_without_secret_needs_no_lookup() {
        let secrets = InMemorySecretStore::default();
        let spec = AlertChannelSpec {
            webhook: Some(WebhookChannel {
                name: Some("custom".to_string()),
                url: "https://hooks.example.com/alert".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };

        let request = build_request(&spec, &secrets, "default", "ignored").await.unwrap();
        match request.config {
            AlertChannelConfig::Webhook(config) => {
                assert_eq!(config.name, "custom");
                assert_eq!(config.webhook_secret, None);
            }
            other => panic!("expected webhook config, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_flags_forwarded_and_threshold_only_with_ssl_expiry() {
        let secrets = InMemorySecretStore::default();
        let mut spec = AlertChannelSpec {
            send_recovery: false,
            send_failure: true,
            send_degraded: true,
            ssl_expiry: false,
            ssl_expiry_threshold: Some(14),
            email: Some(EmailChannel {
                address: "oncall@example.com".to_string(),
            }),
            ..Default::default()
        };

        let request = build_request(&spec, &secrets, "default", "mail").await.unwrap();
        assert!(!request.send_recovery);
        assert!(request.send_degraded);
        assert_eq!(request.ssl_expiry_threshold, None);

        spec.ssl_expiry = true;
        let request = build_request(&spec, &secrets, "default", "mail").await.unwrap();
        assert_eq!(request.ssl_expiry_threshold, Some(14));
    }

    #[tokio::test]
    async fn test_missing_provider_is_invalid_config() {
        let secrets = InMemorySecretStore::default();
        let err = build_request(&AlertChannelSpec::default(), &secrets, "default", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, ControllerError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_ssl_threshold_is_invalid_config() {
        let secrets = InMemorySecretStore::default();
        let spec = AlertChannelSpec {
            ssl_expiry: true,
            ssl_expiry_threshold: Some(99),
            email: Some(EmailChannel {
                address: "oncall@example.com".to_string(),
            }),
            ..Default::default()
        };

        let err = build_request(&spec, &secrets, "default", "mail").await.unwrap_err();
        assert!(matches!(err, ControllerError::InvalidConfig(ref msg) if msg.contains("sslExpiryThreshold")));
    }
}
