//! # Fibonacci Backoff
//!
//! Provides a Fibonacci-based backoff for requeueing failed reconciliations.
//! It grows more slowly than exponential backoff, so a channel stuck on a missing
//! Secret or a Checkly outage is retried steadily without hammering either API.
//!
//! Sequence with the default bounds: 5s, 5s, 10s, 15s, 25s, 40s, ... 300s (max).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Fibonacci backoff calculator
///
/// Each backoff is the sum of the previous two, capped at `max_secs`.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Minimum backoff value in seconds (for reset)
    min_secs: u64,
    /// Previous backoff value in seconds
    prev_secs: u64,
    /// Current backoff value in seconds
    current_secs: u64,
    /// Maximum backoff value in seconds
    max_secs: u64,
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff with minimum and maximum values in seconds
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs,
            prev_secs: 0,
            current_secs: min_secs,
            max_secs,
        }
    }

    /// Get the next backoff duration in seconds and advance the sequence
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let result = self.current_secs;

        let next = self.prev_secs.saturating_add(self.current_secs);
        self.prev_secs = self.current_secs;
        self.current_secs = std::cmp::min(next, self.max_secs);

        result
    }

    /// Get the next backoff duration as a `Duration` and advance the sequence
    #[must_use]
    pub fn next_backoff(&mut self) -> Duration {
        Duration::from_secs(self.next_backoff_seconds())
    }

    /// Reset the backoff to the initial state
    pub fn reset(&mut self) {
        self.prev_secs = 0;
        self.current_secs = self.min_secs;
    }
}

/// Per-object backoff state, keyed by `namespace/name`
///
/// Owned by the watcher, not the reconciler: an entry advances on every failed
/// invocation of that object and is dropped after its next success. An object that
/// disappears while still failing is never reconciled again, so entries that have not
/// failed for twice the maximum backoff are pruned on the next recorded failure.
#[derive(Debug)]
pub struct BackoffRegistry {
    min_secs: u64,
    max_secs: u64,
    states: Mutex<HashMap<String, BackoffEntry>>,
}

#[derive(Debug)]
struct BackoffEntry {
    backoff: FibonacciBackoff,
    last_failure: Instant,
}

impl BackoffRegistry {
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs,
            max_secs,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Record a failure for `key` and return how long to wait before retrying
    pub fn next_delay(&self, key: &str) -> Duration {
        self.next_delay_at(key, Instant::now())
    }

    fn next_delay_at(&self, key: &str, now: Instant) -> Duration {
        let stale_after = Duration::from_secs(self.max_secs.saturating_mul(2));
        let mut states = self.lock();
        states.retain(|k, entry| k == key || now.saturating_duration_since(entry.last_failure) < stale_after);

        let entry = states.entry(key.to_string()).or_insert_with(|| BackoffEntry {
            backoff: FibonacciBackoff::new(self.min_secs, self.max_secs),
            last_failure: now,
        });
        entry.last_failure = now;
        entry.backoff.next_backoff()
    }

    /// Forget the failure history for `key`
    pub fn reset(&self, key: &str) {
        self.lock().remove(key);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, BackoffEntry>> {
        self.states
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
