//! Controller settings loaded from the environment.

use crate::error::ControllerError;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Runtime settings for the AlertChannel controller
#[derive(Clone)]
pub struct ControllerConfig {
    pub api_url: String,
    pub api_key: String,
    pub account_id: String,
    /// Scope for the finalizer token (`<domain>/finalizer`)
    pub domain: String,
    /// Namespace to watch, all namespaces when `None`
    pub namespace: Option<String>,
    pub resync_interval: Duration,
    pub backoff_min_secs: u64,
    pub backoff_max_secs: u64,
    pub metrics_port: u16,
}

impl std::fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("domain", &self.domain)
            .field("namespace", &self.namespace)
            .field("resync_interval", &self.resync_interval)
            .field("backoff_min_secs", &self.backoff_min_secs)
            .field("backoff_max_secs", &self.backoff_max_secs)
            .field("metrics_port", &self.metrics_port)
            .finish()
    }
}

pub const DEFAULT_DOMAIN: &str = "k8s.checklyhq.com";

impl ControllerConfig {
    /// Load settings from process environment variables
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_vars(env::vars().collect())
    }

    fn from_vars(vars: HashMap<String, String>) -> Result<Self, ControllerError> {
        let get = |key: &str| vars.get(key).filter(|v| !v.trim().is_empty()).cloned();
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                ControllerError::Config(format!("{} environment variable is required", key))
            })
        };

        let backoff_min_secs = parse_or(&vars, "BACKOFF_MIN_SECS", 5u64)?;
        let backoff_max_secs = parse_or(&vars, "BACKOFF_MAX_SECS", 300u64)?;
        if backoff_min_secs == 0 || backoff_min_secs > backoff_max_secs {
            return Err(ControllerError::Config(format!(
                "BACKOFF_MIN_SECS ({}) must be positive and not exceed BACKOFF_MAX_SECS ({})",
                backoff_min_secs, backoff_max_secs
            )));
        }

        Ok(Self {
            api_url: get("CHECKLY_API_URL")
                .unwrap_or_else(|| checkly_client::DEFAULT_API_URL.to_string()),
            api_key: required("CHECKLY_API_KEY")?,
            account_id: required("CHECKLY_ACCOUNT_ID")?,
            domain: get("CONTROLLER_DOMAIN").unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            namespace: get("WATCH_NAMESPACE"),
            resync_interval: Duration::from_secs(parse_or(&vars, "RESYNC_INTERVAL_SECS", 600u64)?),
            backoff_min_secs,
            backoff_max_secs,
            metrics_port: parse_or(&vars, "METRICS_PORT", 8080u16)?,
        })
    }

    /// The finalizer token this controller owns
    pub fn finalizer(&self) -> String {
        format!("{}/finalizer", self.domain)
    }
}

fn parse_or<T: FromStr>(vars: &HashMap<String, String>, key: &str, default: T) -> Result<T, ControllerError>
where
    T::Err: std::fmt::Display,
{
    match vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map_err(|e| ControllerError::Config(format!("invalid {} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}
