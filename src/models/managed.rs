//! Provider-defined kinds: managed resources, provider configs, and the
//! generic fallback for everything unrecognised

use async_graphql::{Enum, ID, Json, SimpleObject};
use kube::core::DynamicObject;
use serde::Deserialize;
use serde_json::Value;

use super::meta::{Condition, ConditionedStatus, NameReference, ObjectMeta, SecretReference};
use super::resource::{Envelope, FromObject, ModelingError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Enum)]
pub enum DeletionPolicy {
    Delete,
    Orphan,
}

#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase", default)]
#[graphql(complex)]
pub struct ManagedResourceSpec {
    pub deletion_policy: Option<DeletionPolicy>,
    #[graphql(skip)]
    pub write_connection_secret_to_ref: Option<SecretReference>,
    #[graphql(skip)]
    pub provider_config_ref: Option<NameReference>,
    /// API group of the managed resource, used to find its provider config
    #[serde(skip)]
    #[graphql(skip)]
    pub api_group: String,
}

/// A managed resource: an external resource a provider reconciles
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct ManagedResource {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: ManagedResourceSpec,
    pub status: Option<ConditionedStatus>,
    pub unstructured: Json<Value>,
}

impl FromObject for ManagedResource {
    const VARIANT: &'static str = "ManagedResource";

    fn from_object(object: DynamicObject) -> Result<Self, ModelingError> {
        let env = Envelope::open(object, Self::VARIANT)?;
        let mut spec: ManagedResourceSpec = env.field("spec")?;
        spec.api_group = env.api_group().to_string();
        let status = env.optional("status")?;
        let Envelope {
            id,
            api_version,
            kind,
            metadata,
            raw,
            ..
        } = env;
        Ok(Self {
            id,
            api_version,
            kind,
            metadata,
            spec,
            status,
            unstructured: Json(raw),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(default)]
pub struct ProviderConfigStatus {
    pub conditions: Vec<Condition>,
    /// Number of managed resources using this config
    pub users: Option<i64>,
}

/// Configures how a provider connects to its external API
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct ProviderConfig {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub status: Option<ProviderConfigStatus>,
    pub unstructured: Json<Value>,
}

impl FromObject for ProviderConfig {
    const VARIANT: &'static str = "ProviderConfig";

    fn from_object(object: DynamicObject) -> Result<Self, ModelingError> {
        let env = Envelope::open(object, Self::VARIANT)?;
        let status = env.optional("status")?;
        let Envelope {
            id,
            api_version,
            kind,
            metadata,
            raw,
            ..
        } = env;
        Ok(Self {
            id,
            api_version,
            kind,
            metadata,
            status,
            unstructured: Json(raw),
        })
    }
}

/// Any other object. Read its fields through `unstructured`.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct GenericResource {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub unstructured: Json<Value>,
}

impl FromObject for GenericResource {
    const VARIANT: &'static str = "GenericResource";

    fn from_object(object: DynamicObject) -> Result<Self, ModelingError> {
        let Envelope {
            id,
            api_version,
            kind,
            metadata,
            raw,
            ..
        } = Envelope::open(object, Self::VARIANT)?;
        Ok(Self {
            id,
            api_version,
            kind,
            metadata,
            unstructured: Json(raw),
        })
    }
}
