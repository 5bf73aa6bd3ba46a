//! Paged list results

use async_graphql::{OutputType, SimpleObject};

use super::coreapi::Event;
use super::definitions::{CompositeResourceDefinition, Composition, CustomResourceDefinition};
use super::composites::{CompositeResource, CompositeResourceClaim};
use super::packages::{Configuration, ConfigurationRevision, Provider, ProviderRevision};
use super::resource::{CrossplaneResourceTreeNode, KubernetesResource};

/// A list of nodes and the number of objects that matched, which may be
/// larger than the number of nodes returned.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(concrete(name = "KubernetesResourceConnection", params(KubernetesResource)))]
#[graphql(concrete(name = "EventConnection", params(Event)))]
#[graphql(concrete(name = "ProviderConnection", params(Provider)))]
#[graphql(concrete(name = "ProviderRevisionConnection", params(ProviderRevision)))]
#[graphql(concrete(name = "ConfigurationConnection", params(Configuration)))]
#[graphql(concrete(name = "ConfigurationRevisionConnection", params(ConfigurationRevision)))]
#[graphql(concrete(
    name = "CustomResourceDefinitionConnection",
    params(CustomResourceDefinition)
))]
#[graphql(concrete(
    name = "CompositeResourceDefinitionConnection",
    params(CompositeResourceDefinition)
))]
#[graphql(concrete(name = "CompositionConnection", params(Composition)))]
#[graphql(concrete(name = "CompositeResourceConnection", params(CompositeResource)))]
#[graphql(concrete(
    name = "CompositeResourceClaimConnection",
    params(CompositeResourceClaim)
))]
#[graphql(concrete(
    name = "CrossplaneResourceTreeConnection",
    params(CrossplaneResourceTreeNode)
))]
pub struct Connection<T: OutputType> {
    pub nodes: Vec<T>,
    pub total_count: i32,
}

impl<T: OutputType> Connection<T> {
    /// Connection whose total equals the nodes returned.
    pub fn new(nodes: Vec<T>) -> Self {
        let total = nodes.len();
        Self::with_total(nodes, total)
    }

    pub fn with_total(nodes: Vec<T>, total: usize) -> Self {
        Self {
            nodes,
            total_count: i32::try_from(total).unwrap_or(i32::MAX),
        }
    }
}

impl<T: OutputType> Default for Connection<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            total_count: 0,
        }
    }
}
