//! Reconciliation logic for AlertChannel CRDs.
//!
//! One invocation moves one AlertChannel a single step toward its Checkly counterpart:
//! attach the finalizer, create, update, or tear down. At most one Checkly mutation is
//! issued per invocation and every failure leaves finalizers and status exactly as they
//! were last persisted.

pub mod payload;


use crate::error::ControllerError;
use crate::finalizer::{add_finalizer, remove_finalizer, Lifecycle};
use crate::metrics::Metrics;
use crate::secrets::SecretStore;
use crate::store::{ChannelStore, ObjectKey};
use checkly_client::ChecklyClientTrait;
use crds::{AlertChannel, AlertChannelStatus};
use tracing::{debug, error, info, instrument};

/// What the caller should do after a successful invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Converged for now; wait for the next change or resync
    Done,
    /// Re-invoke immediately
    Requeue,
}

impl ReconcileOutcome {
    fn metric_label(self) -> &'static str {
        match self {
            ReconcileOutcome::Done => "done",
            ReconcileOutcome::Requeue => "requeue",
        }
    }
}

/// Reconciles AlertChannel resources against Checkly.
///
/// Holds only injected collaborators; no per-object state survives an invocation.
pub struct Reconciler {
    pub(crate) checkly_client: Box<dyn ChecklyClientTrait>,
    pub(crate) channels: Box<dyn ChannelStore>,
    pub(crate) secrets: Box<dyn SecretStore>,
    pub(crate) metrics: Metrics,
    finalizer: String,
}

impl Reconciler {
    pub fn new(
        checkly_client: impl ChecklyClientTrait + 'static,
        channels: impl ChannelStore + 'static,
        secrets: impl SecretStore + 'static,
        metrics: Metrics,
        finalizer: impl Into<String>,
    ) -> Self {
        Self {
            checkly_client: Box::new(checkly_client),
            channels: Box::new(channels),
            secrets: Box::new(secrets),
            metrics,
            finalizer: finalizer.into(),
        }
    }

    /// The finalizer token this reconciler owns
    pub fn finalizer(&self) -> &str {
        &self.finalizer
    }

    /// Run one reconcile invocation for the AlertChannel identified by `key`
    #[instrument(skip(self, key), fields(object = %key))]
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileOutcome, ControllerError> {
        let _timer = self.metrics.start_reconcile_timer();

        let result = self.reconcile_once(key).await;
        match &result {
            Ok(outcome) => self.metrics.record_outcome(outcome.metric_label()),
            Err(e) => {
                self.metrics.record_outcome("error");
                self.metrics.record_error(e);
            }
        }
        result
    }

    async fn reconcile_once(&self, key: &ObjectKey) -> Result<ReconcileOutcome, ControllerError> {
        let channel = match self.channels.get(key).await {
            Ok(Some(channel)) => channel,
            Ok(None) => {
                info!("AlertChannel {} not found, assuming it was deleted", key);
                return Ok(ReconcileOutcome::Done);
            }
            Err(e) => {
                // Rely on the next watch event rather than forcing a retry
                error!("Failed to read AlertChannel {}: {}", key, e);
                self.metrics.record_error(&e);
                return Ok(ReconcileOutcome::Done);
            }
        };

        match Lifecycle::of(&channel, &self.finalizer) {
            Lifecycle::Released => {
                debug!("AlertChannel {} is being deleted and already released", key);
                Ok(ReconcileOutcome::Done)
            }
            Lifecycle::TearingDown => self.tear_down(key, channel).await,
            Lifecycle::Unmanaged => self.attach_finalizer(key, channel).await,
            Lifecycle::Managing => self.sync(key, channel).await,
        }
    }

    /// Delete the Checkly channel (if any), then release the object
    async fn tear_down(
        &self,
        key: &ObjectKey,
        mut channel: AlertChannel,
    ) -> Result<ReconcileOutcome, ControllerError> {
        match channel.remote_id() {
            Some(id) => match self.checkly_client.delete_alert_channel(id).await {
                Ok(()) => {
                    self.metrics.record_remote("delete", "success");
                    info!("Deleted Checkly alert channel {} for AlertChannel {}", id, key);
                }
                Err(e) => {
                    self.metrics.record_remote("delete", "error");
                    error!("Failed to delete Checkly alert channel {} for AlertChannel {}: {}", id, key, e);
                    return Err(e.into());
                }
            },
            None => {
                info!("AlertChannel {} was never created in Checkly, skipping remote delete", key);
            }
        }

        remove_finalizer(&mut channel, &self.finalizer);
        self.channels.update(&channel).await.inspect_err(|e| {
            error!("Failed to remove finalizer from AlertChannel {}: {}", key, e);
        })?;
        info!("Removed finalizer from AlertChannel {}", key);
        Ok(ReconcileOutcome::Done)
    }

    /// Durably record the finalizer before any Checkly side effect
    async fn attach_finalizer(
        &self,
        key: &ObjectKey,
        mut channel: AlertChannel,
    ) -> Result<ReconcileOutcome, ControllerError> {
        add_finalizer(&mut channel, &self.finalizer);
        self.channels.update(&channel).await.inspect_err(|e| {
            error!("Failed to add finalizer to AlertChannel {}: {}", key, e);
        })?;
        info!("Added finalizer to AlertChannel {}", key);
        Ok(ReconcileOutcome::Requeue)
    }

    /// Create or update the Checkly channel from the current spec
    async fn sync(
        &self,
        key: &ObjectKey,
        mut channel: AlertChannel,
    ) -> Result<ReconcileOutcome, ControllerError> {
        let request = payload::build_request(&channel.spec, self.secrets.as_ref(), &key.namespace, &key.name)
            .await
            .inspect_err(|e| {
                error!("Failed to assemble Checkly payload for AlertChannel {}: {}", key, e);
            })?;

        if let Some(id) = channel.remote_id() {
            debug!("AlertChannel {} exists in Checkly as {}, updating", key, id);
            if let Err(e) = self.checkly_client.update_alert_channel(id, &request).await {
                self.metrics.record_remote("update", "error");
                error!("Failed to update Checkly alert channel {} for AlertChannel {}: {}", id, key, e);
                return Err(e.into());
            }
            self.metrics.record_remote("update", "success");
            info!("Updated Checkly alert channel {} for AlertChannel {}", id, key);
            return Ok(ReconcileOutcome::Done);
        }

        let created = match self.checkly_client.create_alert_channel(&request).await {
            Ok(created) => created,
            Err(e) => {
                self.metrics.record_remote("create", "error");
                error!("Failed to create Checkly alert channel for AlertChannel {}: {}", key, e);
                return Err(e.into());
            }
        };
        self.metrics.record_remote("create", "success");

        channel.status = Some(AlertChannelStatus {
            remote_id: Some(created.id),
        });
        self.channels.update_status(&channel).await.inspect_err(|e| {
            // The Checkly channel now exists without a recorded id; the next pass creates another
            error!(
                "Created Checkly alert channel {} but failed to record it on AlertChannel {}: {}",
                created.id, key, e
            );
        })?;
        info!("Created Checkly alert channel {} for AlertChannel {}", created.id, key);
        Ok(ReconcileOutcome::Done)
    }
}
