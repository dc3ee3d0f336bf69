//! Resolution of credentials referenced from AlertChannel specs.
//!
//! Values are looked up on every reconcile; nothing is cached.

use crate::error::ControllerError;
use crds::SecretKeyReference;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use tracing::debug;

/// Namespaced lookup of Kubernetes Secrets
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a Secret, `Ok(None)` if it does not exist
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, ControllerError>;
}

/// SecretStore backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl SecretStore for KubeSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, ControllerError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }
}

/// Resolve the value a SecretKeyReference points at
///
/// A missing Secret, a missing field and an empty value all fail with
/// `SecretNotFound`; an empty credential is never valid.
pub async fn resolve_secret_value(
    store: &dyn SecretStore,
    reference: &SecretKeyReference,
    default_namespace: &str,
) -> Result<String, ControllerError> {
    let namespace = reference.namespace_or(default_namespace);
    debug!("Resolving field {} of Secret {}/{}", reference.field_path, namespace, reference.name);

    let secret = store
        .get_secret(namespace, &reference.name)
        .await?
        .ok_or_else(|| {
            ControllerError::SecretNotFound(format!("Secret {}/{} not found", namespace, reference.name))
        })?;

    let bytes = secret
        .data
        .as_ref()
        .and_then(|data| data.get(&reference.field_path))
        .map(|value| value.0.as_slice())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            ControllerError::SecretNotFound(format!(
                "field {} not found or empty in Secret {}/{}",
                reference.field_path, namespace, reference.name
            ))
        })?;

    String::from_utf8(bytes.to_vec()).map_err(|_| {
        ControllerError::InvalidConfig(format!(
            "field {} of Secret {}/{} is not valid UTF-8",
            reference.field_path, namespace, reference.name
        ))
    })
}
