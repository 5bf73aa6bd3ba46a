//! GraphQL schema and resolvers
//!
//! Structure:
//! - `context.rs` - Per-field sessions, settings and writes
//! - `errors.rs` - Field errors and how they are recorded
//! - `query.rs`, `mutation.rs` - Root operations
//! - `meta.rs`, `coreapi.rs`, `packages.rs`, `definitions.rs`, `composites.rs`, `managed.rs` -
//!   Fields that fetch more objects
//! - `tree.rs` - Claim to composed resource walk
//!
//! Every resolver that performs I/O opens a [`Session`] from the request
//! context. Failures are recorded against the field and never abort the
//! rest of the response.

pub mod composites;
pub mod context;
pub mod coreapi;
pub mod definitions;
pub mod errors;
pub mod managed;
pub mod meta;
pub mod mutation;
pub mod packages;
pub mod query;
pub mod tree;

#[cfg(test)]
mod testkit;

use std::sync::Arc;

use async_graphql::{EmptySubscription, Schema};

pub use context::{Session, Settings, WriteOp};
pub use errors::FieldError;
pub use mutation::{KubernetesResourceInput, KubernetesResourcePayload, Mutation, PatchInput};
pub use query::Query;

use crate::kube::ClientFactory;

pub type CrossgraphSchema = Schema<Query, Mutation, EmptySubscription>;

/// Build the schema. The factory and settings are shared by every request;
/// per-request [`Credentials`](crate::kube::Credentials) are attached to
/// each request as data.
pub fn build_schema(factory: Arc<dyn ClientFactory>, settings: Settings) -> CrossgraphSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(factory)
        .data(settings)
        .finish()
}

/// The schema in SDL form.
pub fn sdl() -> String {
    Schema::build(Query, Mutation, EmptySubscription).finish().sdl()
}
