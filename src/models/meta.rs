//! Object metadata and status conditions shared by every model

use std::collections::BTreeMap;

use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::reference::ObjectReference;

/// Metadata common to all persisted objects
#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase", default)]
#[graphql(complex)]
pub struct ObjectMeta {
    pub name: String,
    pub generate_name: Option<String>,
    pub namespace: Option<String>,
    pub uid: String,
    pub resource_version: Option<String>,
    pub generation: Option<i64>,
    #[serde(rename = "creationTimestamp")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(rename = "deletionTimestamp")]
    pub deletion_time: Option<DateTime<Utc>>,
    #[graphql(skip)]
    pub owner_references: Vec<OwnerReference>,
    #[graphql(skip)]
    pub labels: BTreeMap<String, String>,
    #[graphql(skip)]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn namespace_str(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }
}

/// Link from an object to the object that owns it
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub uid: String,
    pub controller: bool,
    pub block_owner_deletion: bool,
}

impl OwnerReference {
    /// Owners always live in the namespace of the owned object, or are
    /// cluster scoped.
    pub fn to_reference(&self, namespace: &str) -> ObjectReference {
        ObjectReference::new(&self.api_version, &self.kind, namespace, &self.name)
            .with_uid(self.uid.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Enum)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// A status condition, such as `Ready` or `Synced`
#[derive(Debug, Clone, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    #[graphql(name = "type")]
    pub condition_type: String,
    pub status: ConditionStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub last_transition_time: Option<DateTime<Utc>>,
}

/// Status carrying only conditions
#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(default)]
pub struct ConditionedStatus {
    pub conditions: Vec<Condition>,
}

/// Reference to a cluster scoped object by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, SimpleObject)]
#[serde(default)]
pub struct NameReference {
    pub name: String,
}

/// Reference to a secret in a given namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, SimpleObject)]
#[serde(default)]
pub struct SecretReference {
    pub name: String,
    pub namespace: String,
}

/// Type of an object, without identifying an instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeReference {
    pub api_version: String,
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_metadata() {
        let meta: ObjectMeta = serde_json::from_value(json!({
            "name": "db",
            "namespace": "prod",
            "uid": "u-1",
            "creationTimestamp": "2024-03-01T10:00:00Z",
            "labels": {"app": "db"},
            "ownerReferences": [
                {"apiVersion": "v1", "kind": "X", "name": "x", "uid": "u-x"},
                {"apiVersion": "v1", "kind": "Y", "name": "y", "uid": "u-y", "controller": true}
            ]
        }))
        .unwrap();
        assert_eq!(meta.name, "db");
        assert_eq!(meta.namespace_str(), "prod");
        assert!(meta.creation_time.is_some());
        assert_eq!(meta.labels.get("app").map(String::as_str), Some("db"));
        assert_eq!(meta.owner_references.len(), 2);
        assert!(!meta.owner_references[0].controller);
        assert!(meta.owner_references[1].controller);
    }

    #[test]
    fn test_owner_reference_keeps_uid() {
        let owner = OwnerReference {
            api_version: "pkg.crossplane.io/v1".to_string(),
            kind: "Provider".to_string(),
            name: "p".to_string(),
            uid: "u-p".to_string(),
            controller: true,
            block_owner_deletion: true,
        };
        let r = owner.to_reference("");
        assert_eq!(r.uid, "u-p");
        assert_eq!(r.name, "p");
    }

    #[test]
    fn test_condition_decoding() {
        let c: Condition = serde_json::from_value(json!({
            "type": "Ready",
            "status": "True",
            "reason": "Available",
            "lastTransitionTime": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(c.condition_type, "Ready");
        assert_eq!(c.status, ConditionStatus::True);
        assert!(c.message.is_none());
    }
}
