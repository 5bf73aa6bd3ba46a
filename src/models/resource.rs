//! The closed set of resource models and the mapper that produces them
//!
//! [`model_object`] is a pure function: one fetched object in, one
//! [`KubernetesResource`] out. Known kinds are matched by type first, then
//! [`classify`] decides between the managed, provider config, composite,
//! claim and generic shapes.

use async_graphql::{ID, SimpleObject, Union};
use kube::core::DynamicObject;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::classify::{ResourceClass, classify, structural_categories};
use super::composites::{CompositeResource, CompositeResourceClaim};
use super::coreapi::{ConfigMap, Secret};
use super::definitions::{CompositeResourceDefinition, Composition, CustomResourceDefinition};
use super::kind::KnownKind;
use super::managed::{GenericResource, ManagedResource, ProviderConfig};
use super::meta::ObjectMeta;
use super::packages::{Configuration, ConfigurationRevision, Provider, ProviderRevision};
use super::reference::ObjectReference;

/// An object could not be decoded into the model chosen for it
#[derive(Debug, thiserror::Error)]
#[error("cannot model {name} as {variant}: {source}")]
pub struct ModelingError {
    pub variant: &'static str,
    pub name: String,
    #[source]
    pub source: serde_json::Error,
}

/// Models that can be built from a fetched object
pub trait FromObject: Sized {
    /// Name of the model, used in modeling errors
    const VARIANT: &'static str;

    fn from_object(object: DynamicObject) -> Result<Self, ModelingError>;
}

/// Accessors every resource model shares
pub trait Resource {
    fn meta(&self) -> &ObjectMeta;

    fn type_ref(&self) -> (&str, &str);

    /// Reference to this object, uid included.
    fn reference(&self) -> ObjectReference {
        let (api_version, kind) = self.type_ref();
        let meta = self.meta();
        ObjectReference::new(api_version, kind, meta.namespace_str(), &meta.name)
            .with_uid(meta.uid.clone())
    }
}

macro_rules! impl_resource {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Resource for $ty {
                fn meta(&self) -> &ObjectMeta {
                    &self.metadata
                }

                fn type_ref(&self) -> (&str, &str) {
                    (&self.api_version, &self.kind)
                }
            }
        )+
    };
}

impl_resource!(
    Provider,
    ProviderRevision,
    Configuration,
    ConfigurationRevision,
    CustomResourceDefinition,
    CompositeResourceDefinition,
    Composition,
    CompositeResource,
    CompositeResourceClaim,
    ManagedResource,
    ProviderConfig,
    GenericResource,
    Secret,
    ConfigMap,
    super::coreapi::Event,
);

/// An object opened for decoding: type, metadata and the raw JSON
pub(crate) struct Envelope {
    pub variant: &'static str,
    pub id: ID,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub raw: Value,
}

impl Envelope {
    pub fn open(object: DynamicObject, variant: &'static str) -> Result<Self, ModelingError> {
        let name = object.metadata.name.clone().unwrap_or_default();
        let fail = |source| ModelingError {
            variant,
            name: name.clone(),
            source,
        };

        let raw = serde_json::to_value(&object).map_err(fail)?;
        let metadata: ObjectMeta = match raw.get("metadata") {
            Some(meta) => serde_json::from_value(meta.clone()).map_err(fail)?,
            None => ObjectMeta::default(),
        };
        let (api_version, kind) = match object.types {
            Some(types) => (types.api_version, types.kind),
            None => (
                raw.get("apiVersion").and_then(Value::as_str).unwrap_or_default().to_string(),
                raw.get("kind").and_then(Value::as_str).unwrap_or_default().to_string(),
            ),
        };
        let id =
            ObjectReference::new(&api_version, &kind, metadata.namespace_str(), &metadata.name)
                .id();

        Ok(Self {
            variant,
            id,
            api_version,
            kind,
            metadata,
            raw,
        })
    }

    pub fn error(&self, source: serde_json::Error) -> ModelingError {
        ModelingError {
            variant: self.variant,
            name: self.metadata.name.clone(),
            source,
        }
    }

    /// Decode a top-level field; absent or null yields the default.
    pub fn field<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, ModelingError> {
        Ok(self.optional(key)?.unwrap_or_default())
    }

    /// Decode a top-level field; absent or null yields `None`.
    pub fn optional<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ModelingError> {
        match self.raw.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| self.error(e)),
        }
    }

    /// Decode the whole object.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ModelingError> {
        serde_json::from_value(self.raw.clone()).map_err(|e| self.error(e))
    }

    pub fn api_group(&self) -> &str {
        match self.api_version.split_once('/') {
            Some((group, _)) => group,
            None => "",
        }
    }
}

/// Every kind of object the API can return
#[derive(Debug, Clone, Union)]
pub enum KubernetesResource {
    Provider(Provider),
    ProviderRevision(ProviderRevision),
    Configuration(Configuration),
    ConfigurationRevision(ConfigurationRevision),
    CustomResourceDefinition(CustomResourceDefinition),
    CompositeResourceDefinition(CompositeResourceDefinition),
    Composition(Composition),
    CompositeResource(CompositeResource),
    CompositeResourceClaim(CompositeResourceClaim),
    ManagedResource(ManagedResource),
    ProviderConfig(ProviderConfig),
    Secret(Secret),
    ConfigMap(ConfigMap),
    GenericResource(GenericResource),
}

impl KubernetesResource {
    fn inner(&self) -> &dyn Resource {
        match self {
            KubernetesResource::Provider(r) => r,
            KubernetesResource::ProviderRevision(r) => r,
            KubernetesResource::Configuration(r) => r,
            KubernetesResource::ConfigurationRevision(r) => r,
            KubernetesResource::CustomResourceDefinition(r) => r,
            KubernetesResource::CompositeResourceDefinition(r) => r,
            KubernetesResource::Composition(r) => r,
            KubernetesResource::CompositeResource(r) => r,
            KubernetesResource::CompositeResourceClaim(r) => r,
            KubernetesResource::ManagedResource(r) => r,
            KubernetesResource::ProviderConfig(r) => r,
            KubernetesResource::Secret(r) => r,
            KubernetesResource::ConfigMap(r) => r,
            KubernetesResource::GenericResource(r) => r,
        }
    }

    pub fn reference(&self) -> ObjectReference {
        self.inner().reference()
    }

    pub fn meta(&self) -> &ObjectMeta {
        self.inner().meta()
    }

    /// GraphQL type name of the variant
    pub fn variant(&self) -> &'static str {
        match self {
            KubernetesResource::Provider(_) => Provider::VARIANT,
            KubernetesResource::ProviderRevision(_) => ProviderRevision::VARIANT,
            KubernetesResource::Configuration(_) => Configuration::VARIANT,
            KubernetesResource::ConfigurationRevision(_) => ConfigurationRevision::VARIANT,
            KubernetesResource::CustomResourceDefinition(_) => CustomResourceDefinition::VARIANT,
            KubernetesResource::CompositeResourceDefinition(_) => {
                CompositeResourceDefinition::VARIANT
            }
            KubernetesResource::Composition(_) => Composition::VARIANT,
            KubernetesResource::CompositeResource(_) => CompositeResource::VARIANT,
            KubernetesResource::CompositeResourceClaim(_) => CompositeResourceClaim::VARIANT,
            KubernetesResource::ManagedResource(_) => ManagedResource::VARIANT,
            KubernetesResource::ProviderConfig(_) => ProviderConfig::VARIANT,
            KubernetesResource::Secret(_) => Secret::VARIANT,
            KubernetesResource::ConfigMap(_) => ConfigMap::VARIANT,
            KubernetesResource::GenericResource(_) => GenericResource::VARIANT,
        }
    }
}

/// Model one fetched object.
///
/// `categories` are those of the object's defining CRD when the caller knows
/// them; pass an empty slice otherwise and hints are inferred from the
/// object's shape.
pub fn model_object(
    object: DynamicObject,
    categories: &[String],
) -> Result<KubernetesResource, ModelingError> {
    let known = object
        .types
        .as_ref()
        .and_then(|t| KnownKind::from_type(&t.api_version, &t.kind));

    let resource = match known {
        Some(KnownKind::Provider) => KubernetesResource::Provider(Provider::from_object(object)?),
        Some(KnownKind::ProviderRevision) => {
            KubernetesResource::ProviderRevision(ProviderRevision::from_object(object)?)
        }
        Some(KnownKind::Configuration) => {
            KubernetesResource::Configuration(Configuration::from_object(object)?)
        }
        Some(KnownKind::ConfigurationRevision) => {
            KubernetesResource::ConfigurationRevision(ConfigurationRevision::from_object(object)?)
        }
        Some(KnownKind::CustomResourceDefinition) => KubernetesResource::CustomResourceDefinition(
            CustomResourceDefinition::from_object(object)?,
        ),
        Some(KnownKind::CompositeResourceDefinition) => {
            KubernetesResource::CompositeResourceDefinition(
                CompositeResourceDefinition::from_object(object)?,
            )
        }
        Some(KnownKind::Composition) => {
            KubernetesResource::Composition(Composition::from_object(object)?)
        }
        Some(KnownKind::Secret) => KubernetesResource::Secret(Secret::from_object(object)?),
        Some(KnownKind::ConfigMap) => {
            KubernetesResource::ConfigMap(ConfigMap::from_object(object)?)
        }
        Some(KnownKind::Event) => {
            KubernetesResource::GenericResource(GenericResource::from_object(object)?)
        }
        None => {
            let inferred;
            let categories = if categories.is_empty() {
                inferred = structural_categories(&object);
                inferred.as_slice()
            } else {
                categories
            };
            model_unknown(object, categories)?
        }
    };
    Ok(resource)
}

fn model_unknown(
    object: DynamicObject,
    categories: &[String],
) -> Result<KubernetesResource, ModelingError> {
    let resource = match classify(&object, categories) {
        ResourceClass::Managed => {
            KubernetesResource::ManagedResource(ManagedResource::from_object(object)?)
        }
        ResourceClass::ProviderConfig => {
            KubernetesResource::ProviderConfig(ProviderConfig::from_object(object)?)
        }
        ResourceClass::Composite => {
            KubernetesResource::CompositeResource(CompositeResource::from_object(object)?)
        }
        ResourceClass::Claim => {
            KubernetesResource::CompositeResourceClaim(CompositeResourceClaim::from_object(
                object,
            )?)
        }
        ResourceClass::Generic => {
            KubernetesResource::GenericResource(GenericResource::from_object(object)?)
        }
    };
    Ok(resource)
}

/// One node of a claim → composite → composed resource walk
#[derive(Debug, Clone, SimpleObject)]
pub struct CrossplaneResourceTreeNode {
    /// Id of the node this one was reached from; null for the root
    pub parent_id: Option<ID>,
    pub resource: KubernetesResource,
}
