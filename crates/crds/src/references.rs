//! Kubernetes object references used by AlertChannel CRDs
//!
//! Credentials are never embedded in an AlertChannel spec. Instead the spec points at a
//! field of a namespaced `Secret`, and the controller resolves the value on every reconcile.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to a single field of a Kubernetes `Secret`
///
/// Mirrors the subset of `ObjectReference` the controller needs:
/// - `name`: name of the Secret (required)
/// - `namespace`: namespace of the Secret (optional, defaults to the AlertChannel's namespace)
/// - `fieldPath`: key inside `Secret.data` holding the value
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeyReference {
    /// Name of the referenced Secret
    pub name: String,

    /// Namespace of the referenced Secret (defaults to the namespace of the referencing resource)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Key within the Secret's data
    pub field_path: String,
}

impl SecretKeyReference {
    /// Create a reference to a Secret in the same namespace as the referencing resource
    pub fn new(name: impl Into<String>, field_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            field_path: field_path.into(),
        }
    }

    /// Create a reference to a Secret in an explicit namespace
    pub fn with_namespace(
        name: impl Into<String>,
        namespace: impl Into<String>,
        field_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            field_path: field_path.into(),
        }
    }

    /// Namespace to look the Secret up in, falling back to `default_namespace`
    pub fn namespace_or<'a>(&'a self, default_namespace: &'a str) -> &'a str {
        self.namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(default_namespace)
    }
}

/// Key/value pair used for webhook headers and query parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct KeyValue {
    /// Header or query parameter name
    pub key: String,

    /// Header or query parameter value
    pub value: String,

    /// Whether the value is hidden in the Checkly UI
    #[serde(default)]
    pub locked: bool,
}
