//! Persistence of AlertChannel objects.
//!
//! The reconciler only ever writes two things back to Kubernetes: the finalizer list and
//! the `status` subresource. Both writes carry the `resourceVersion` that was read, so the
//! API server rejects a write against a stale copy with 409 Conflict.

use crate::error::ControllerError;
use crds::AlertChannel;
use kube::api::{Api, Patch, PatchParams};
use kube::{Client, ResourceExt};
use serde_json::json;
use std::fmt;
use tracing::debug;

/// Identity of one AlertChannel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of an object delivered by the watcher
    pub fn of(channel: &AlertChannel) -> Self {
        Self::new(channel.namespace().unwrap_or_default(), channel.name_any())
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Read-modify-write access to AlertChannel objects
#[async_trait::async_trait]
pub trait ChannelStore: Send + Sync {
    /// Fetch the object, `Ok(None)` if it no longer exists
    async fn get(&self, key: &ObjectKey) -> Result<Option<AlertChannel>, ControllerError>;

    /// Persist `metadata.finalizers` of `channel`
    async fn update(&self, channel: &AlertChannel) -> Result<AlertChannel, ControllerError>;

    /// Persist the `status` subresource of `channel`
    async fn update_status(&self, channel: &AlertChannel) -> Result<AlertChannel, ControllerError>;
}

/// ChannelStore backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeChannelStore {
    client: Client,
}

impl KubeChannelStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<AlertChannel> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Map a write failure, separating optimistic concurrency conflicts from other API errors
pub(crate) fn map_write_error(err: kube::Error, key: &ObjectKey) -> ControllerError {
    match err {
        kube::Error::Api(resp) if resp.code == 409 => ControllerError::Conflict(format!(
            "AlertChannel {} was modified concurrently: {}",
            key, resp.message
        )),
        other => ControllerError::Kube(other),
    }
}

#[async_trait::async_trait]
impl ChannelStore for KubeChannelStore {
    async fn get(&self, key: &ObjectKey) -> Result<Option<AlertChannel>, ControllerError> {
        Ok(self.api(&key.namespace).get_opt(&key.name).await?)
    }

    async fn update(&self, channel: &AlertChannel) -> Result<AlertChannel, ControllerError> {
        let key = ObjectKey::of(channel);
        let patch = json!({
            "metadata": {
                "resourceVersion": channel.resource_version(),
                "finalizers": channel.finalizers(),
            }
        });
        debug!("Patching finalizers of AlertChannel {}: {:?}", key, channel.finalizers());

        self.api(&key.namespace)
            .patch(&key.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| map_write_error(e, &key))
    }

    async fn update_status(&self, channel: &AlertChannel) -> Result<AlertChannel, ControllerError> {
        let key = ObjectKey::of(channel);
        let patch = json!({
            "metadata": { "resourceVersion": channel.resource_version() },
            "status": channel.status,
        });
        debug!("Patching status of AlertChannel {}", key);

        self.api(&key.namespace)
            .patch_status(&key.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| map_write_error(e, &key))
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
