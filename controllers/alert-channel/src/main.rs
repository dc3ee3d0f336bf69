//! AlertChannel Controller
//!
//! Keeps Checkly alert channels in sync with `AlertChannel` custom resources:
//! - attaches a finalizer before touching Checkly
//! - creates the channel and records its Checkly ID in status
//! - pushes spec changes to the existing channel
//! - deletes the channel before letting Kubernetes remove the resource

mod backoff;
mod config;
mod controller;
mod error;
mod finalizer;
mod metrics;
mod reconciler;
mod secrets;
mod server;
mod store;
mod watcher;

#[cfg(test)]
mod test_utils;

use anyhow::anyhow;
use config::ControllerConfig;
use controller::Controller;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("Starting AlertChannel Controller");

    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  Checkly API: {}", config.api_url);
    info!("  Account: {}", config.account_id);
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Resync interval: {}s", config.resync_interval.as_secs());

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
