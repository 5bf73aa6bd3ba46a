//! crossgraph library
//!
//! A GraphQL facade over Crossplane objects. The binary serves it over HTTP;
//! the library exposes the schema, models and Kubernetes plumbing for tests
//! and embedding.

pub mod cli;
pub mod config;
pub mod events;
pub mod fieldpath;
pub mod graph;
pub mod kube;
pub mod models;
pub mod server;

pub use graph::{CrossgraphSchema, build_schema, sdl};
