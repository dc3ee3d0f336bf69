//! Mock ChecklyClient for unit testing
//!
//! This module provides a mock implementation of ChecklyClientTrait that can be used
//! in unit tests without talking to the Checkly API. Every call is journaled so tests
//! can assert on exactly which remote operations a reconcile performed.

use crate::checkly_trait::ChecklyClientTrait;
use crate::error::ChecklyError;
use crate::models::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A remote operation recorded by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    ValidateToken,
    Get(i64),
    Create(AlertChannelRequest),
    Update(i64, AlertChannelRequest),
    Delete(i64),
}

/// Operation selector for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    ValidateToken,
    Get,
    Create,
    Update,
    Delete,
}

/// Error a failing operation returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    NotFound,
    Authentication,
    Api(String),
}

impl MockFailure {
    fn to_error(&self) -> ChecklyError {
        match self {
            MockFailure::NotFound => ChecklyError::NotFound("mock: not found".to_string()),
            MockFailure::Authentication => {
                ChecklyError::Authentication("mock: unauthorized".to_string())
            }
            MockFailure::Api(msg) => ChecklyError::Api(msg.clone()),
        }
    }
}

/// Mock ChecklyClient for testing
///
/// Alert channels live in memory; IDs are handed out sequentially from `first_id`.
#[derive(Clone)]
pub struct MockChecklyClient {
    base_url: String,
    channels: Arc<Mutex<HashMap<i64, AlertChannel>>>,
    failures: Arc<Mutex<HashMap<MockOperation, MockFailure>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    next_id: Arc<Mutex<i64>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockChecklyClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_first_id(base_url, 1)
    }

    /// Create a new mock client whose first created channel gets `first_id`
    pub fn with_first_id(base_url: impl Into<String>, first_id: i64) -> Self {
        Self {
            base_url: base_url.into(),
            channels: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(Mutex::new(first_id)),
        }
    }

    /// Add an alert channel to the mock store (for test setup)
    pub fn add_alert_channel(&self, channel: AlertChannel) {
        lock(&self.channels).insert(channel.id, channel);
    }

    /// Look up a stored alert channel without journaling the call
    pub fn alert_channel(&self, id: i64) -> Option<AlertChannel> {
        lock(&self.channels).get(&id).cloned()
    }

    /// Number of stored alert channels
    pub fn alert_channel_count(&self) -> usize {
        lock(&self.channels).len()
    }

    /// Make every subsequent `operation` fail with `failure`
    pub fn fail(&self, operation: MockOperation, failure: MockFailure) {
        lock(&self.failures).insert(operation, failure);
    }

    /// Stop failing `operation`
    pub fn clear_failure(&self, operation: MockOperation) {
        lock(&self.failures).remove(&operation);
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Forget recorded calls
    pub fn reset_calls(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: MockCall, operation: MockOperation) -> Result<(), ChecklyError> {
        lock(&self.calls).push(call);
        match lock(&self.failures).get(&operation) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    /// Generate next ID
    fn next_id(&self) -> i64 {
        let mut id = lock(&self.next_id);
        let current = *id;
        *id += 1;
        current
    }

    fn to_channel(id: i64, request: &AlertChannelRequest) -> AlertChannel {
        let config = serde_json::to_value(&request.config)
            .ok()
            .and_then(|v| v.get("config").cloned())
            .unwrap_or_default();

        AlertChannel {
            id,
            channel_type: request.config.channel_type().to_string(),
            config,
            send_recovery: Some(request.send_recovery),
            send_failure: Some(request.send_failure),
            send_degraded: Some(request.send_degraded),
            ssl_expiry: Some(request.ssl_expiry),
            ssl_expiry_threshold: request.ssl_expiry_threshold,
            created_at: None,
            updated_at: None,
        }
    }
}

#[async_trait::async_trait]
impl ChecklyClientTrait for MockChecklyClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_token(&self) -> Result<(), ChecklyError> {
        self.record(MockCall::ValidateToken, MockOperation::ValidateToken)
    }

    async fn get_alert_channel(&self, id: i64) -> Result<AlertChannel, ChecklyError> {
        self.record(MockCall::Get(id), MockOperation::Get)?;
        self.alert_channel(id)
            .ok_or_else(|| ChecklyError::NotFound(format!("Alert channel {} not found", id)))
    }

    async fn create_alert_channel(&self, request: &AlertChannelRequest) -> Result<AlertChannel, ChecklyError> {
        self.record(MockCall::Create(request.clone()), MockOperation::Create)?;
        let channel = Self::to_channel(self.next_id(), request);
        lock(&self.channels).insert(channel.id, channel.clone());
        Ok(channel)
    }

    async fn update_alert_channel(&self, id: i64, request: &AlertChannelRequest) -> Result<AlertChannel, ChecklyError> {
        self.record(MockCall::Update(id, request.clone()), MockOperation::Update)?;
        let mut channels = lock(&self.channels);
        if !channels.contains_key(&id) {
            return Err(ChecklyError::NotFound(format!("Alert channel {} not found", id)));
        }
        let channel = Self::to_channel(id, request);
        channels.insert(id, channel.clone());
        Ok(channel)
    }

    async fn delete_alert_channel(&self, id: i64) -> Result<(), ChecklyError> {
        self.record(MockCall::Delete(id), MockOperation::Delete)?;
        lock(&self.channels)
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ChecklyError::NotFound(format!("Alert channel {} not found", id)))
    }
}
