//! Resource models
//!
//! Structure:
//! - `kind.rs` - Kinds with a dedicated model
//! - `reference.rs` - Object references and resource ids
//! - `meta.rs` - Metadata, owner references and conditions
//! - `packages.rs`, `definitions.rs`, `composites.rs`, `managed.rs`, `coreapi.rs` -
//!   One model per kind
//! - `resource.rs` - The `KubernetesResource` union and the object mapper
//! - `classify.rs` - Heuristics for kinds defined by providers
//! - `inference.rs` - Version picking and ownership rules
//! - `connection.rs` - List results

pub mod classify;
pub mod composites;
pub mod connection;
pub mod coreapi;
pub mod definitions;
pub mod inference;
pub mod kind;
pub mod managed;
pub mod meta;
pub mod packages;
pub mod reference;
pub mod resource;

pub use classify::{ResourceClass, classify};
pub use composites::{CompositeResource, CompositeResourceClaim};
pub use connection::Connection;
pub use coreapi::{ConfigMap, Event, EventType, Secret};
pub use definitions::{CompositeResourceDefinition, Composition, CustomResourceDefinition};
pub use inference::{VersionEntry, active_revision, controller_of, pick_version};
pub use kind::KnownKind;
pub use managed::{GenericResource, ManagedResource, ProviderConfig};
pub use meta::{ObjectMeta, OwnerReference};
pub use packages::{Configuration, ConfigurationRevision, Provider, ProviderRevision};
pub use reference::{ObjectReference, ReferenceId, ReferenceIdError, gvk_for};
pub use resource::{
    CrossplaneResourceTreeNode, FromObject, KubernetesResource, ModelingError, Resource,
    model_object,
};
