//! Crossplane packages: providers, configurations and their revisions

use async_graphql::{Enum, ID, Json, SimpleObject};
use kube::core::DynamicObject;
use serde::Deserialize;
use serde_json::Value;

use super::inference::Revision;
use super::meta::{Condition, ObjectMeta, OwnerReference};
use super::reference::ObjectReference;
use super::resource::{Envelope, FromObject, ModelingError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Enum)]
pub enum PackageRevisionDesiredState {
    #[default]
    Inactive,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Enum)]
pub enum RevisionActivationPolicy {
    Automatic,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Enum)]
pub enum PackagePullPolicy {
    Always,
    Never,
    IfNotPresent,
}

/// Desired state of a provider or configuration
#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageSpec {
    /// OCI image reference of the package
    pub package: String,
    pub revision_activation_policy: Option<RevisionActivationPolicy>,
    pub revision_history_limit: Option<i64>,
    pub package_pull_policy: Option<PackagePullPolicy>,
    pub ignore_crossplane_constraints: Option<bool>,
    pub skip_dependency_resolution: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageStatus {
    pub conditions: Vec<Condition>,
    pub current_revision: Option<String>,
    pub current_identifier: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageRevisionSpec {
    pub desired_state: PackageRevisionDesiredState,
    pub package: String,
    pub revision: i64,
    pub package_pull_policy: Option<PackagePullPolicy>,
    pub ignore_crossplane_constraints: Option<bool>,
    pub skip_dependency_resolution: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase", default)]
#[graphql(complex)]
pub struct ProviderRevisionStatus {
    pub conditions: Vec<Condition>,
    pub found_dependencies: Option<i64>,
    pub installed_dependencies: Option<i64>,
    pub invalid_dependencies: Option<i64>,
    #[graphql(skip)]
    pub object_refs: Vec<ObjectReference>,
}

#[derive(Debug, Clone, Default, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase", default)]
#[graphql(complex)]
pub struct ConfigurationRevisionStatus {
    pub conditions: Vec<Condition>,
    pub found_dependencies: Option<i64>,
    pub installed_dependencies: Option<i64>,
    pub invalid_dependencies: Option<i64>,
    #[graphql(skip)]
    pub object_refs: Vec<ObjectReference>,
}

/// A Crossplane provider package
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Provider {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: PackageSpec,
    pub status: Option<PackageStatus>,
    pub unstructured: Json<Value>,
}

/// One installed version of a provider
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct ProviderRevision {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: PackageRevisionSpec,
    pub status: Option<ProviderRevisionStatus>,
    pub unstructured: Json<Value>,
}

/// A Crossplane configuration package
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Configuration {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: PackageSpec,
    pub status: Option<PackageStatus>,
    pub unstructured: Json<Value>,
}

/// One installed version of a configuration
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct ConfigurationRevision {
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: PackageRevisionSpec,
    pub status: Option<ConfigurationRevisionStatus>,
    pub unstructured: Json<Value>,
}

impl FromObject for Provider {
    const VARIANT: &'static str = "Provider";

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

impl FromObject for Configuration {
    const VARIANT: &'static str = "Configuration";

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

impl FromObject for ProviderRevision {
    const VARIANT: &'static str = "ProviderRevision";

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

impl FromObject for ConfigurationRevision {
    const VARIANT: &'static str = "ConfigurationRevision";

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

impl Revision for ProviderRevision {
    fn desired_state(&self) -> PackageRevisionDesiredState {
        self.spec.desired_state
    }

    fn revision(&self) -> i64 {
        self.spec.revision
    }

    fn owner_references(&self) -> &[OwnerReference] {
        &self.metadata.owner_references
    }
}

impl Revision for ConfigurationRevision {
    fn desired_state(&self) -> PackageRevisionDesiredState {
        self.spec.desired_state
    }

    fn revision(&self) -> i64 {
        self.spec.revision
    }

    fn owner_references(&self) -> &[OwnerReference] {
        &self.metadata.owner_references
    }
}
