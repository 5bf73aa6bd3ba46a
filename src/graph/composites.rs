//! Composite resource and claim fields

use async_graphql::{ComplexObject, Context};

use super::context::Session;
use super::coreapi::object_events;
use super::definitions::get_composition;
use super::errors::{FieldError, record, recover};
use crate::kube::ObjectKey;
use crate::models::composites::{CompositeResourceClaimSpec, CompositeResourceSpec};
use crate::models::{
    CompositeResource, CompositeResourceClaim, Composition, Connection, Event, FromObject,
    KnownKind, KubernetesResource, ObjectReference, Resource, Secret, model_object,
};

/// Get a secret, treating not found as absent.
pub(crate) async fn get_secret(
    ctx: &Context<'_>,
    namespace: &str,
    name: &str,
) -> Result<Option<Secret>, FieldError> {
    let session = Session::acquire(ctx).await?;
    let key = ObjectKey::namespaced(namespace, name);
    match session.get_opt(&KnownKind::Secret.gvk(), &key).await? {
        Some(object) => Ok(Some(Secret::from_object(object)?)),
        None => Ok(None),
    }
}

/// Get the object `reference` points at and model it as `T`.
async fn get_as<T: FromObject>(
    ctx: &Context<'_>,
    reference: &ObjectReference,
) -> Result<Option<T>, FieldError> {
    let session = Session::acquire(ctx).await?;
    let object = session.get_ref(reference).await?;
    Ok(Some(T::from_object(object)?))
}

#[ComplexObject]
impl CompositeResource {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }
}

#[ComplexObject]
impl CompositeResourceSpec {
    async fn composition(&self, ctx: &Context<'_>) -> Option<Composition> {
        let reference = self.composition_ref.as_ref()?;
        recover(ctx, get_composition(ctx, reference).await)
    }

    /// The claim this composite resource is bound to.
    async fn claim(&self, ctx: &Context<'_>) -> Option<CompositeResourceClaim> {
        let reference = self.claim_ref.as_ref()?;
        recover(ctx, get_as::<CompositeResourceClaim>(ctx, reference).await)
    }

    /// The composed resources. Resources that cannot be fetched are
    /// recorded and left out of the connection.
    async fn resources(&self, ctx: &Context<'_>) -> Connection<KubernetesResource> {
        if self.resource_refs.is_empty() {
            return Connection::default();
        }
        recover(ctx, self.resolve_resources(ctx).await)
    }

    async fn connection_secret(&self, ctx: &Context<'_>) -> Option<Secret> {
        let reference = self.write_connection_secret_to_ref.as_ref()?;
        recover(ctx, get_secret(ctx, &reference.namespace, &reference.name).await)
    }
}

impl CompositeResourceSpec {
    async fn resolve_resources(
        &self,
        ctx: &Context<'_>,
    ) -> Result<Connection<KubernetesResource>, FieldError> {
        let session = Session::acquire(ctx).await?;
        let mut nodes = Vec::with_capacity(self.resource_refs.len());
        for reference in &self.resource_refs {
            let modeled = match session.get_ref(reference).await {
                Ok(object) => model_object(object, &[]).map_err(FieldError::from),
                Err(e) => Err(e),
            };
            match modeled {
                Ok(resource) => nodes.push(resource),
                Err(e) => record(ctx, e),
            }
        }
        Ok(Connection::new(nodes))
    }
}

#[ComplexObject]
impl CompositeResourceClaim {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }
}

#[ComplexObject]
impl CompositeResourceClaimSpec {
    async fn composition(&self, ctx: &Context<'_>) -> Option<Composition> {
        let reference = self.composition_ref.as_ref()?;
        recover(ctx, get_composition(ctx, reference).await)
    }

    /// The composite resource this claim is bound to.
    async fn resource(&self, ctx: &Context<'_>) -> Option<CompositeResource> {
        let reference = self.resource_ref.as_ref()?;
        recover(ctx, get_as::<CompositeResource>(ctx, reference).await)
    }

    async fn connection_secret(&self, ctx: &Context<'_>) -> Option<Secret> {
        let reference = self.write_connection_secret_to_ref.as_ref()?;
        recover(ctx, get_secret(ctx, &self.namespace, &reference.name).await)
    }
}
