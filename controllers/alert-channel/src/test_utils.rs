//! Test utilities for unit testing the reconciler
//!
//! In-memory stand-ins for the Kubernetes API, plus a tower service that lets the
//! kube-backed stores run against canned API server responses.

use crate::error::ControllerError;
use crate::secrets::SecretStore;
use crate::store::{ChannelStore, ObjectKey};
use crds::{AlertChannel, AlertChannelSpec, WebhookChannel};
use http::{Request, Response};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::client::Body;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

pub const TEST_FINALIZER: &str = "k8s.checklyhq.com/finalizer";

/// Helper to create a test AlertChannel with a webhook provider and no status
pub fn create_test_channel(namespace: &str, name: &str) -> AlertChannel {
    AlertChannel {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            resource_version: Some("1".to_string()),
            ..Default::default()
        },
        spec: AlertChannelSpec {
            webhook: Some(WebhookChannel {
                url: "https://hooks.example.com/alert".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        },
        status: None,
    }
}

/// Helper to create a test Secret holding the given string fields
pub fn create_test_secret(namespace: &str, name: &str, fields: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
                .collect::<BTreeMap<_, _>>(),
        ),
        ..Default::default()
    }
}

/// ChannelStore that keeps objects in memory and enforces resourceVersion checks
/// the way the API server does for patches carrying a resourceVersion.
#[derive(Clone, Default)]
pub struct InMemoryChannelStore {
    objects: Arc<Mutex<HashMap<ObjectKey, AlertChannel>>>,
    fail_get: Arc<AtomicBool>,
    concurrent_writer: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryChannelStore {
    pub fn insert(&self, channel: AlertChannel) {
        self.objects
            .lock()
            .unwrap()
            .insert(ObjectKey::of(&channel), channel);
    }

    /// Current stored copy, bypassing the trait
    pub fn stored(&self, key: &ObjectKey) -> Option<AlertChannel> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Make `get` fail with a non-NotFound error
    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    /// Bump the stored resourceVersion right after the next read, as if another
    /// writer got in between
    pub fn simulate_concurrent_write(&self) {
        self.concurrent_writer.store(true, Ordering::SeqCst);
    }

    /// Number of successful writes
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn write(
        &self,
        channel: &AlertChannel,
        apply: impl FnOnce(&mut AlertChannel),
    ) -> Result<AlertChannel, ControllerError> {
        let key = ObjectKey::of(channel);
        let mut objects = self.objects.lock().unwrap();
        let stored = objects
            .get_mut(&key)
            .ok_or_else(|| ControllerError::Conflict(format!("AlertChannel {} no longer exists", key)))?;

        if stored.resource_version() != channel.resource_version() {
            return Err(ControllerError::Conflict(format!(
                "AlertChannel {} has resourceVersion {:?}, write was based on {:?}",
                key,
                stored.resource_version(),
                channel.resource_version()
            )));
        }

        apply(stored);
        bump(stored);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(stored.clone())
    }
}

fn bump(channel: &mut AlertChannel) {
    let next = channel
        .resource_version()
        .and_then(|rv| rv.parse::<u64>().ok())
        .unwrap_or(0)
        + 1;
    channel.metadata.resource_version = Some(next.to_string());
}

#[async_trait::async_trait]
impl ChannelStore for InMemoryChannelStore {
    async fn get(&self, key: &ObjectKey) -> Result<Option<AlertChannel>, ControllerError> {
        if self.fail_get.load(Ordering::SeqCst) {
            let decode_error = serde_json::from_str::<AlertChannel>("not json").unwrap_err();
            return Err(ControllerError::Serialization(decode_error));
        }

        let mut objects = self.objects.lock().unwrap();
        let found = objects.get(key).cloned();
        if self.concurrent_writer.swap(false, Ordering::SeqCst) {
            if let Some(stored) = objects.get_mut(key) {
                bump(stored);
            }
        }
        Ok(found)
    }

    async fn update(&self, channel: &AlertChannel) -> Result<AlertChannel, ControllerError> {
        let finalizers = channel.metadata.finalizers.clone();
        self.write(channel, |stored| stored.metadata.finalizers = finalizers)
    }

    async fn update_status(&self, channel: &AlertChannel) -> Result<AlertChannel, ControllerError> {
        let status = channel.status.clone();
        self.write(channel, |stored| stored.status = status)
    }
}

/// SecretStore that serves Secrets from memory
#[derive(Clone, Default)]
pub struct InMemorySecretStore {
    secrets: Arc<Mutex<HashMap<(String, String), Secret>>>,
}

impl InMemorySecretStore {
    pub fn insert(&self, secret: Secret) {
        let key = (secret.namespace().unwrap_or_default(), secret.name_any());
        self.secrets.lock().unwrap().insert(key, secret);
    }
}

#[async_trait::async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, ControllerError> {
        Ok(self
            .secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }
}

/// A mock Kubernetes API server that returns predefined responses by method and path,
/// and records the requests it saw.
#[derive(Clone, Default)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A request seen by `MockService`
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Request body parsed as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `method` requests for exactly `path`
    pub fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// Requests received so far as (method, path)
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.method.clone(), r.path.clone()))
            .collect()
    }

    /// Requests received so far, including their bodies
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let requests = self.requests.clone();

        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .get(&(method.clone(), path.clone()))
            .cloned()
            .unwrap_or_else(|| (404, status_json(404, "NotFound", &format!("{} not found", path))));

        Box::pin(async move {
            let request_body = req.into_body().collect_bytes().await?.to_vec();
            requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                body: request_body,
            });
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// A Kubernetes `Status` failure body
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}
