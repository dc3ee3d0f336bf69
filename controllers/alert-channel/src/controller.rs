//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the Checkly client, the
//! Kubernetes stores and the reconciler together, then runs the watcher and the
//! metrics/probe server until shutdown.

use crate::backoff::BackoffRegistry;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crate::reconciler::Reconciler;
use crate::secrets::KubeSecretStore;
use crate::server::{start_server, ServerState};
use crate::store::KubeChannelStore;
use crate::watcher::{watch_alert_channels, WatchContext};
use checkly_client::{ChecklyClient, ChecklyClientTrait};
use crds::AlertChannel;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Main controller for AlertChannel resources.
pub struct Controller {
    watcher: JoinHandle<Result<(), ControllerError>>,
    server: JoinHandle<Result<(), anyhow::Error>>,
}

impl Controller {
    /// Creates a new controller instance and starts its background tasks.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing AlertChannel Controller");

        let kube_client = Client::try_default().await?;

        let checkly_client = ChecklyClient::new(
            config.api_url.clone(),
            config.api_key.clone(),
            config.account_id.clone(),
        )?;

        // Validate credentials before proceeding
        info!("Validating Checkly API key and connectivity...");
        checkly_client.validate_token().await.map_err(|e| {
            error!("Failed to validate Checkly API key: {}", e);
            error!("Please ensure CHECKLY_API_KEY and CHECKLY_ACCOUNT_ID are set correctly");
            error!("and that Checkly is reachable at {}", config.api_url);
            ControllerError::Checkly(e)
        })?;
        info!("Checkly API key validated");

        let metrics = Metrics::new()
            .map_err(|e| ControllerError::Config(format!("failed to register metrics: {}", e)))?;

        let reconciler = Reconciler::new(
            checkly_client,
            KubeChannelStore::new(kube_client.clone()),
            KubeSecretStore::new(kube_client.clone()),
            metrics.clone(),
            config.finalizer(),
        );
        info!("Using finalizer {}", reconciler.finalizer());

        let state = Arc::new(ServerState::new(metrics));
        let server = {
            let state = state.clone();
            let port = config.metrics_port;
            tokio::spawn(async move { start_server(port, state).await })
        };

        let api: Api<AlertChannel> = match config.namespace.as_deref() {
            Some(ns) => Api::namespaced(kube_client, ns),
            None => Api::all(kube_client),
        };
        let ctx = Arc::new(WatchContext {
            reconciler: Arc::new(reconciler),
            backoff: BackoffRegistry::new(config.backoff_min_secs, config.backoff_max_secs),
            resync_interval: config.resync_interval,
        });
        let watcher = tokio::spawn(async move { watch_alert_channels(api, ctx).await });
        state.set_ready();

        Ok(Self { watcher, server })
    }

    /// Runs the controller until shutdown.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("AlertChannel Controller running");

        tokio::select! {
            result = &mut self.watcher => {
                result.map_err(|e| ControllerError::Watch(format!("AlertChannel watcher panicked: {}", e)))??;
                info!("Shutdown signal received, AlertChannel Controller stopped");
            }
            result = &mut self.server => {
                let reason = match result {
                    Ok(Ok(())) => "exited".to_string(),
                    Ok(Err(e)) => e.to_string(),
                    Err(e) => format!("panicked: {}", e),
                };
                self.watcher.abort();
                return Err(ControllerError::Watch(format!("HTTP server stopped: {}", reason)));
            }
        }

        self.server.abort();
        Ok(())
    }
}
