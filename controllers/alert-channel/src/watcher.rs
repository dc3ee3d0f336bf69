//! Kubernetes resource watcher.
//!
//! Drives the reconciler from `kube_runtime::Controller`, which owns watch reconnection,
//! per-object serialization and requeue scheduling. The reconciler returns an outcome;
//! this module turns it into a requeue `Action` and owns the error backoff.

use crate::backoff::BackoffRegistry;
use crate::error::ControllerError;
use crate::reconciler::{ReconcileOutcome, Reconciler};
use crate::store::ObjectKey;
use crds::AlertChannel;
use futures::StreamExt;
use kube::Api;
use kube_runtime::{
    controller::{Action, Config as ControllerConfig},
    watcher, Controller,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shared state handed to every reconcile and error-policy call
pub struct WatchContext {
    pub reconciler: Arc<Reconciler>,
    pub backoff: BackoffRegistry,
    pub resync_interval: Duration,
}

/// Map a reconcile outcome to the next scheduled invocation
fn action_for(outcome: ReconcileOutcome, resync_interval: Duration) -> Action {
    match outcome {
        ReconcileOutcome::Done => Action::requeue(resync_interval),
        ReconcileOutcome::Requeue => Action::requeue(Duration::ZERO),
    }
}

async fn reconcile(obj: Arc<AlertChannel>, ctx: Arc<WatchContext>) -> Result<Action, ControllerError> {
    let key = ObjectKey::of(&obj);
    debug!("Reconciling AlertChannel {}", key);

    let outcome = ctx.reconciler.reconcile(&key).await?;
    ctx.backoff.reset(&key.to_string());
    Ok(action_for(outcome, ctx.resync_interval))
}

fn error_policy(obj: Arc<AlertChannel>, error: &ControllerError, ctx: Arc<WatchContext>) -> Action {
    let key = ObjectKey::of(&obj);
    let delay = ctx.backoff.next_delay(&key.to_string());
    warn!(
        "Reconciliation error for AlertChannel {}: {} (retrying in {}s)",
        key,
        error,
        delay.as_secs()
    );
    Action::requeue(delay)
}

/// Watch AlertChannels until a shutdown signal arrives
///
/// On SIGTERM/SIGINT the controller stops scheduling new invocations and drops
/// in-flight reconcile futures.
pub async fn watch_alert_channels(
    api: Api<AlertChannel>,
    ctx: Arc<WatchContext>,
) -> Result<(), ControllerError> {
    info!("Starting AlertChannel watcher");

    // Debounce batches bursts of events for the same object
    let controller_config = ControllerConfig::default()
        .debounce(Duration::from_secs(1))
        .concurrency(3);

    Controller::new(api, watcher::Config::default())
        .with_config(controller_config)
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!("Reconciled {}", obj),
                Err(e) => warn!("Controller error for AlertChannel: {}", e),
            }
        })
        .await;

    info!("AlertChannel watcher stopped");
    Ok(())
}
