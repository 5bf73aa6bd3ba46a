//! Composite resources (XRs) and their claims (XRCs)

use async_graphql::{ID, Json, SimpleObject};
use chrono::{DateTime, Utc};
use kube::core::DynamicObject;
use serde::Deserialize;
use serde_json::Value;

use super::meta::{Condition, NameReference, ObjectMeta, SecretReference};
use super::reference::ObjectReference;
use super::resource::{Envelope, FromObject, ModelingError};

#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase", default)]
#[graphql(complex)]
pub struct CompositeResourceSpec {
    pub composition_update_policy: Option<String>,
    #[graphql(skip)]
    pub composition_ref: Option<NameReference>,
    #[graphql(skip)]
    pub claim_ref: Option<ObjectReference>,
    #[graphql(skip)]
    pub resource_refs: Vec<ObjectReference>,
    #[graphql(skip)]
    pub write_connection_secret_to_ref: Option<SecretReference>,
}

#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionDetails {
    pub last_published_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase", default)]
pub struct CompositeResourceStatus {
    pub conditions: Vec<Condition>,
    pub connection_details: Option<ConnectionDetails>,
}

/// A composite resource
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct CompositeResource {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: CompositeResourceSpec,
    pub status: Option<CompositeResourceStatus>,
    pub unstructured: Json<Value>,
}

impl FromObject for CompositeResource {
    const VARIANT: &'static str = "CompositeResource";

    fn from_object(object: DynamicObject) -> Result<Self, ModelingError> {
        let env = Envelope::open(object, Self::VARIANT)?;
        let spec = env.field("spec")?;
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
#[serde(rename_all = "camelCase", default)]
#[graphql(complex)]
pub struct CompositeResourceClaimSpec {
    pub composition_update_policy: Option<String>,
    /// Background or Foreground deletion of the bound composite.
    pub composite_delete_policy: Option<String>,
    #[graphql(skip)]
    pub composition_ref: Option<NameReference>,
    #[graphql(skip)]
    pub resource_ref: Option<ObjectReference>,
    /// Secrets written for a claim live in the claim's namespace.
    #[graphql(skip)]
    pub write_connection_secret_to_ref: Option<NameReference>,
    #[serde(skip)]
    #[graphql(skip)]
    pub namespace: String,
}

/// A claim for a composite resource
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct CompositeResourceClaim {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: CompositeResourceClaimSpec,
    pub status: Option<CompositeResourceStatus>,
    pub unstructured: Json<Value>,
}

impl FromObject for CompositeResourceClaim {
    const VARIANT: &'static str = "CompositeResourceClaim";

    fn from_object(object: DynamicObject) -> Result<Self, ModelingError> {
        let env = Envelope::open(object, Self::VARIANT)?;
        let mut spec: CompositeResourceClaimSpec = env.field("spec")?;
        spec.namespace = env.metadata.namespace_str().to_string();
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
