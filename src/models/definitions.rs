//! Type definitions: CRDs, XRDs and compositions

use async_graphql::{Enum, ID, Json, SimpleObject};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1 as apiext;
use kube::core::DynamicObject;
use serde::Deserialize;
use serde_json::Value;

use super::inference::VersionEntry;
use super::meta::{ConditionedStatus, NameReference, ObjectMeta, TypeReference};
use super::resource::{Envelope, FromObject, ModelingError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Enum)]
pub enum ResourceScope {
    #[default]
    Namespaced,
    Cluster,
}

/// Names a definition gives the kind it defines
#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomResourceDefinitionNames {
    pub plural: String,
    pub singular: Option<String>,
    pub short_names: Vec<String>,
    pub kind: String,
    pub list_kind: Option<String>,
    pub categories: Vec<String>,
}

impl From<apiext::CustomResourceDefinitionNames> for CustomResourceDefinitionNames {
    fn from(names: apiext::CustomResourceDefinitionNames) -> Self {
        Self {
            plural: names.plural,
            singular: names.singular,
            short_names: names.short_names.unwrap_or_default(),
            kind: names.kind,
            list_kind: names.list_kind,
            categories: names.categories.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct CustomResourceDefinitionVersion {
    pub name: String,
    pub served: bool,
    pub storage: bool,
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct CustomResourceDefinitionSpec {
    pub group: String,
    pub names: CustomResourceDefinitionNames,
    pub scope: ResourceScope,
    pub versions: Vec<CustomResourceDefinitionVersion>,
}

impl From<apiext::CustomResourceDefinitionSpec> for CustomResourceDefinitionSpec {
    fn from(spec: apiext::CustomResourceDefinitionSpec) -> Self {
        Self {
            group: spec.group,
            names: spec.names.into(),
            scope: match spec.scope.as_str() {
                "Cluster" => ResourceScope::Cluster,
                _ => ResourceScope::Namespaced,
            },
            versions: spec
                .versions
                .into_iter()
                .map(|v| CustomResourceDefinitionVersion {
                    name: v.name,
                    served: v.served,
                    storage: v.storage,
                })
                .collect(),
        }
    }
}

impl CustomResourceDefinitionSpec {
    /// CRD versions have no notion of referenceable.
    pub fn version_entries(&self) -> Vec<VersionEntry> {
        self.versions
            .iter()
            .map(|v| VersionEntry {
                name: v.name.clone(),
                served: v.served,
                referenceable: false,
            })
            .collect()
    }
}

/// A CustomResourceDefinition
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct CustomResourceDefinition {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: CustomResourceDefinitionSpec,
    pub status: Option<ConditionedStatus>,
    pub unstructured: Json<Value>,
}

impl FromObject for CustomResourceDefinition {
    const VARIANT: &'static str = "CustomResourceDefinition";

    fn from_object(object: DynamicObject) -> Result<Self, ModelingError> {
        let env = Envelope::open(object, Self::VARIANT)?;
        let spec: apiext::CustomResourceDefinitionSpec = env.field("spec")?;
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
            spec: spec.into(),
            status,
            unstructured: Json(raw),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(default)]
pub struct CompositeResourceDefinitionVersion {
    pub name: String,
    pub served: bool,
    pub referenceable: bool,
}

#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase", default)]
#[graphql(complex)]
pub struct CompositeResourceDefinitionSpec {
    pub group: String,
    pub names: CustomResourceDefinitionNames,
    pub claim_names: Option<CustomResourceDefinitionNames>,
    pub connection_secret_keys: Vec<String>,
    #[graphql(skip)]
    pub default_composition_ref: Option<NameReference>,
    #[graphql(skip)]
    pub enforced_composition_ref: Option<NameReference>,
    pub versions: Vec<CompositeResourceDefinitionVersion>,
}

impl CompositeResourceDefinitionSpec {
    pub fn version_entries(&self) -> Vec<VersionEntry> {
        self.versions
            .iter()
            .map(|v| VersionEntry {
                name: v.name.clone(),
                served: v.served,
                referenceable: v.referenceable,
            })
            .collect()
    }
}

/// A CompositeResourceDefinition (XRD)
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct CompositeResourceDefinition {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: CompositeResourceDefinitionSpec,
    pub status: Option<ConditionedStatus>,
    pub unstructured: Json<Value>,
}

impl FromObject for CompositeResourceDefinition {
    const VARIANT: &'static str = "CompositeResourceDefinition";

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
pub struct CompositionSpec {
    pub composite_type_ref: TypeReference,
    pub mode: Option<String>,
    pub write_connection_secrets_to_namespace: Option<String>,
}

/// A Composition
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Composition {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: CompositionSpec,
    pub unstructured: Json<Value>,
}

impl FromObject for Composition {
    const VARIANT: &'static str = "Composition";

    fn from_object(object: DynamicObject) -> Result<Self, ModelingError> {
        let env = Envelope::open(object, Self::VARIANT)?;
        let spec = env.field("spec")?;
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
            unstructured: Json(raw),
        })
    }
}
