//! Metadata fields: owners, controller, labels and annotations

use std::collections::BTreeMap;

use async_graphql::{ComplexObject, Context, Json};

use super::context::Session;
use super::errors::{FieldError, record, recover};
use crate::models::meta::ObjectMeta;
use crate::models::{Connection, KubernetesResource, OwnerReference, controller_of, model_object};

#[ComplexObject]
impl ObjectMeta {
    /// Objects that own this one. Pass `controller` to keep only the
    /// controller (true) or only the other owners (false).
    async fn owners(
        &self,
        ctx: &Context<'_>,
        controller: Option<bool>,
    ) -> Connection<KubernetesResource> {
        let owners: Vec<&OwnerReference> = self
            .owner_references
            .iter()
            .filter(|o| controller.is_none_or(|c| o.controller == c))
            .collect();
        if owners.is_empty() {
            return Connection::default();
        }
        recover(ctx, self.resolve_owners(ctx, &owners).await)
    }

    /// The owner marked as controller, if any.
    async fn controller(&self, ctx: &Context<'_>) -> Option<KubernetesResource> {
        let owner = controller_of(&self.owner_references)?;
        recover(ctx, self.resolve_owner(ctx, owner).await)
    }

    /// Labels, limited to `keys` when given.
    async fn labels(&self, keys: Option<Vec<String>>) -> Json<BTreeMap<String, String>> {
        Json(select(&self.labels, keys))
    }

    /// Annotations, limited to `keys` when given.
    async fn annotations(&self, keys: Option<Vec<String>>) -> Json<BTreeMap<String, String>> {
        Json(select(&self.annotations, keys))
    }
}

impl ObjectMeta {
    async fn resolve_owners(
        &self,
        ctx: &Context<'_>,
        owners: &[&OwnerReference],
    ) -> Result<Connection<KubernetesResource>, FieldError> {
        let session = Session::acquire(ctx).await?;
        let mut nodes = Vec::with_capacity(owners.len());
        for owner in owners {
            let reference = owner.to_reference(self.namespace_str());
            match session.get_ref(&reference).await {
                Ok(object) => match model_object(object, &[]) {
                    Ok(resource) => nodes.push(resource),
                    Err(e) => record(ctx, e.into()),
                },
                Err(e) => record(ctx, e),
            }
        }
        Ok(Connection::new(nodes))
    }

    async fn resolve_owner(
        &self,
        ctx: &Context<'_>,
        owner: &OwnerReference,
    ) -> Result<Option<KubernetesResource>, FieldError> {
        let session = Session::acquire(ctx).await?;
        let reference = owner.to_reference(self.namespace_str());
        let object = session.get_ref(&reference).await?;
        Ok(Some(model_object(object, &[])?))
    }
}

/// Copy of `map`, restricted to `keys` when given.
pub(crate) fn select(
    map: &BTreeMap<String, String>,
    keys: Option<Vec<String>>,
) -> BTreeMap<String, String> {
    match keys {
        None => map.clone(),
        Some(keys) => keys
            .into_iter()
            .filter_map(|k| map.get(&k).map(|v| (k, v.clone())))
            .collect(),
    }
}
