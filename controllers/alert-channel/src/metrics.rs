//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `alert_channel_reconciliations_total{outcome}` - Finished reconciliations by outcome
//! - `alert_channel_reconcile_errors_total{error}` - Failed reconciliations by error kind
//! - `alert_channel_remote_operations_total{operation,result}` - Checkly API mutations
//! - `alert_channel_reconcile_duration_seconds` - Duration of reconciliations

use crate::error::ControllerError;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramTimer, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Controller metrics and the registry they are exposed from
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    reconciliations: IntCounterVec,
    reconcile_errors: IntCounterVec,
    remote_operations: IntCounterVec,
    reconcile_duration: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let reconciliations = IntCounterVec::new(
            Opts::new(
                "alert_channel_reconciliations_total",
                "Total number of finished AlertChannel reconciliations",
            ),
            &["outcome"],
        )?;
        let reconcile_errors = IntCounterVec::new(
            Opts::new(
                "alert_channel_reconcile_errors_total",
                "Total number of failed AlertChannel reconciliations",
            ),
            &["error"],
        )?;
        let remote_operations = IntCounterVec::new(
            Opts::new(
                "alert_channel_remote_operations_total",
                "Total number of Checkly alert channel mutations",
            ),
            &["operation", "result"],
        )?;
        let reconcile_duration = Histogram::with_opts(
            HistogramOpts::new(
                "alert_channel_reconcile_duration_seconds",
                "Duration of AlertChannel reconciliation in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        )?;

        registry.register(Box::new(reconciliations.clone()))?;
        registry.register(Box::new(reconcile_errors.clone()))?;
        registry.register(Box::new(remote_operations.clone()))?;
        registry.register(Box::new(reconcile_duration.clone()))?;

        Ok(Self {
            registry,
            reconciliations,
            reconcile_errors,
            remote_operations,
            reconcile_duration,
        })
    }

    pub fn record_outcome(&self, outcome: &str) {
        self.reconciliations.with_label_values(&[outcome]).inc();
    }

    pub fn record_error(&self, error: &ControllerError) {
        self.reconcile_errors
            .with_label_values(&[error.metric_label()])
            .inc();
    }

    pub fn record_remote(&self, operation: &str, result: &str) {
        self.remote_operations
            .with_label_values(&[operation, result])
            .inc();
    }

    pub fn start_reconcile_timer(&self) -> HistogramTimer {
        self.reconcile_duration.start_timer()
    }

    /// Render all metrics in the Prometheus text format
    pub fn encode(&self) -> Result<Vec<u8>, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }

    #[cfg(test)]
    pub fn remote_count(&self, operation: &str, result: &str) -> u64 {
        self.remote_operations
            .with_label_values(&[operation, result])
            .get()
    }

    #[cfg(test)]
    pub fn outcome_count(&self, outcome: &str) -> u64 {
        self.reconciliations.with_label_values(&[outcome]).get()
    }
}
