//! Finalizer bookkeeping and lifecycle classification.
//!
//! The finalizer token and the deletion timestamp together are the persisted state of
//! an AlertChannel's relationship with Checkly. `Lifecycle` is their typed projection;
//! the reconciler decides what to do by matching on it and nothing else.

use crds::AlertChannel;

/// Where an AlertChannel stands in the finalizer protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not deleted, finalizer not attached yet
    Unmanaged,
    /// Not deleted, finalizer attached; the remote channel is kept in sync
    Managing,
    /// Deleted, finalizer still attached; the remote channel must be removed first
    TearingDown,
    /// Deleted, finalizer already removed; nothing left to do
    Released,
}

impl Lifecycle {
    pub fn of(channel: &AlertChannel, finalizer: &str) -> Self {
        match (channel.is_being_deleted(), channel.has_finalizer(finalizer)) {
            (false, false) => Lifecycle::Unmanaged,
            (false, true) => Lifecycle::Managing,
            (true, true) => Lifecycle::TearingDown,
            (true, false) => Lifecycle::Released,
        }
    }
}

/// Add `finalizer` unless already present
pub fn add_finalizer(channel: &mut AlertChannel, finalizer: &str) {
    let finalizers = channel.metadata.finalizers.get_or_insert_with(Vec::new);
    if !finalizers.iter().any(|f| f == finalizer) {
        finalizers.push(finalizer.to_string());
    }
}

/// Remove every occurrence of `finalizer`, leaving other controllers' tokens alone
pub fn remove_finalizer(channel: &mut AlertChannel, finalizer: &str) {
    if let Some(finalizers) = channel.metadata.finalizers.as_mut() {
        finalizers.retain(|f| f != finalizer);
    }
}
