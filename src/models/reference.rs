//! Object references and the opaque resource id

use std::fmt;

use async_graphql::ID;
use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use kube::core::GroupVersionKind;
use serde::{Deserialize, Serialize};

use crate::kube::ObjectKey;

/// Parse an `apiVersion` into group and version.
pub fn gvk_for(api_version: &str, kind: &str) -> GroupVersionKind {
    let (group, version) = match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    };
    GroupVersionKind::gvk(group, version, kind)
}

/// Points at one object. When `uid` is set it identifies the object
/// exactly; otherwise the other four fields do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectReference {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub uid: String,
}

impl ObjectReference {
    pub fn new(api_version: &str, kind: &str, namespace: &str, name: &str) -> Self {
        Self {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            uid: String::new(),
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn gvk(&self) -> GroupVersionKind {
        gvk_for(&self.api_version, &self.kind)
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::from_parts(&self.namespace, &self.name)
    }

    pub fn id(&self) -> ID {
        ID(ReferenceId::from(self).encode())
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceIdError {
    #[error("id is not valid base64: {0}")]
    Encoding(String),

    #[error("id must have four '|' separated parts, found {0}")]
    Parts(usize),

    #[error("id is missing its {0}")]
    Missing(&'static str),
}

/// Decoded form of a resource id: `apiVersion|kind|namespace|name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceId {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl ReferenceId {
    pub fn encode(&self) -> String {
        STANDARD_NO_PAD.encode(format!(
            "{}|{}|{}|{}",
            self.api_version, self.kind, self.namespace, self.name
        ))
    }

    pub fn decode(id: &str) -> Result<Self, ReferenceIdError> {
        let bytes = STANDARD_NO_PAD
            .decode(id)
            .map_err(|e| ReferenceIdError::Encoding(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| ReferenceIdError::Encoding(e.to_string()))?;
        let parts: Vec<&str> = text.split('|').collect();
        let [api_version, kind, namespace, name] = parts.as_slice() else {
            return Err(ReferenceIdError::Parts(parts.len()));
        };
        if api_version.is_empty() {
            return Err(ReferenceIdError::Missing("apiVersion"));
        }
        if kind.is_empty() {
            return Err(ReferenceIdError::Missing("kind"));
        }
        if name.is_empty() {
            return Err(ReferenceIdError::Missing("name"));
        }
        Ok(Self {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    pub fn to_reference(&self) -> ObjectReference {
        ObjectReference::new(&self.api_version, &self.kind, &self.namespace, &self.name)
    }
}

impl From<&ObjectReference> for ReferenceId {
    fn from(r: &ObjectReference) -> Self {
        Self {
            api_version: r.api_version.clone(),
            kind: r.kind.clone(),
            namespace: r.namespace.clone(),
            name: r.name.clone(),
        }
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_encoding() {
        let r = ObjectReference::new("v1", "Secret", "default", "creds");
        // base64("v1|Secret|default|creds") without padding
        assert_eq!(r.id().as_str(), "djF8U2VjcmV0fGRlZmF1bHR8Y3JlZHM");
        let decoded = ReferenceId::decode("djF8U2VjcmV0fGRlZmF1bHR8Y3JlZHM").unwrap();
        assert_eq!(decoded.to_reference(), r);
    }

    #[test]
    fn test_cluster_scoped_id() {
        let r = ObjectReference::new("pkg.crossplane.io/v1", "Provider", "", "provider-aws");
        let decoded = ReferenceId::decode(r.id().as_str()).unwrap();
        assert_eq!(decoded.namespace, "");
        assert_eq!(decoded.to_reference().key(), ObjectKey::cluster("provider-aws"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            ReferenceId::decode("!!!"),
            Err(ReferenceIdError::Encoding(_))
        ));
        let two_parts = STANDARD_NO_PAD.encode("v1|Secret");
        assert_eq!(ReferenceId::decode(&two_parts), Err(ReferenceIdError::Parts(2)));
        let no_name = STANDARD_NO_PAD.encode("v1|Secret|default|");
        assert_eq!(
            ReferenceId::decode(&no_name),
            Err(ReferenceIdError::Missing("name"))
        );
    }

    #[test]
    fn test_gvk_for() {
        let gvk = gvk_for("apiextensions.crossplane.io/v1", "Composition");
        assert_eq!(gvk.group, "apiextensions.crossplane.io");
        assert_eq!(gvk.version, "v1");
        let core = gvk_for("v1", "ConfigMap");
        assert_eq!(core.group, "");
        assert_eq!(core.version, "v1");
    }
}
