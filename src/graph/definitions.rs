//! CRD, XRD and composition fields

use async_graphql::{ComplexObject, Context};
use kube::core::GroupVersionKind;

use super::context::{Session, model_each};
use super::coreapi::object_events;
use super::errors::{FieldError, record, recover};
use crate::kube::ObjectKey;
use crate::models::definitions::CompositeResourceDefinitionSpec;
use crate::models::meta::NameReference;
use crate::models::{
    CompositeResource, CompositeResourceClaim, CompositeResourceDefinition, Composition,
    Connection, CustomResourceDefinition, Event, FromObject, KnownKind, KubernetesResource,
    Resource, model_object, pick_version,
};

#[ComplexObject]
impl CustomResourceDefinition {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }

    /// Objects of the kind this CRD defines, read at `version` or at the
    /// version picked from the CRD.
    async fn defined_resources(
        &self,
        ctx: &Context<'_>,
        version: Option<String>,
        namespace: Option<String>,
    ) -> Connection<KubernetesResource> {
        recover(ctx, self.list_defined(ctx, version, namespace).await)
    }
}

impl CustomResourceDefinition {
    async fn list_defined(
        &self,
        ctx: &Context<'_>,
        version: Option<String>,
        namespace: Option<String>,
    ) -> Result<Connection<KubernetesResource>, FieldError> {
        let spec = &self.spec;
        let version = pick_version(version.as_deref(), &spec.version_entries());
        let gvk = GroupVersionKind::gvk(&spec.group, &version, &spec.names.kind);

        let session = Session::acquire(ctx).await?;
        let objects = session.list(&gvk, namespace).await?;
        let total = objects.len();

        let mut nodes = Vec::with_capacity(total);
        for object in objects {
            match model_object(object, &spec.names.categories) {
                Ok(resource) => nodes.push(resource),
                Err(e) => record(ctx, e.into()),
            }
        }
        Ok(Connection::with_total(nodes, total))
    }
}

#[ComplexObject]
impl CompositeResourceDefinition {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }

    /// Composite resources of the kind this XRD defines.
    async fn defined_composite_resources(
        &self,
        ctx: &Context<'_>,
        version: Option<String>,
    ) -> Connection<CompositeResource> {
        let gvk = self.gvk_for(version, &self.spec.names.kind);
        recover(ctx, list_defined::<CompositeResource>(ctx, &gvk, None).await)
    }

    /// Claims of the kind this XRD offers, if it offers one.
    async fn defined_composite_resource_claims(
        &self,
        ctx: &Context<'_>,
        version: Option<String>,
        namespace: Option<String>,
    ) -> Connection<CompositeResourceClaim> {
        let Some(claim_names) = &self.spec.claim_names else {
            return Connection::default();
        };
        let gvk = self.gvk_for(version, &claim_names.kind);
        recover(ctx, list_defined::<CompositeResourceClaim>(ctx, &gvk, namespace).await)
    }
}

impl CompositeResourceDefinition {
    fn gvk_for(&self, version: Option<String>, kind: &str) -> GroupVersionKind {
        let version = pick_version(version.as_deref(), &self.spec.version_entries());
        GroupVersionKind::gvk(&self.spec.group, &version, kind)
    }
}

async fn list_defined<T>(
    ctx: &Context<'_>,
    gvk: &GroupVersionKind,
    namespace: Option<String>,
) -> Result<Connection<T>, FieldError>
where
    T: FromObject + async_graphql::OutputType,
{
    let session = Session::acquire(ctx).await?;
    let objects = session.list(gvk, namespace).await?;
    let total = objects.len();
    Ok(Connection::with_total(model_each(ctx, objects), total))
}

#[ComplexObject]
impl CompositeResourceDefinitionSpec {
    /// Composition used when a composite resource does not pick one.
    async fn default_composition(&self, ctx: &Context<'_>) -> Option<Composition> {
        let reference = self.default_composition_ref.as_ref()?;
        recover(ctx, get_composition(ctx, reference).await)
    }

    /// Composition every composite resource of this type must use.
    async fn enforced_composition(&self, ctx: &Context<'_>) -> Option<Composition> {
        let reference = self.enforced_composition_ref.as_ref()?;
        recover(ctx, get_composition(ctx, reference).await)
    }
}

/// Get a composition by name.
pub(crate) async fn get_composition(
    ctx: &Context<'_>,
    reference: &NameReference,
) -> Result<Option<Composition>, FieldError> {
    let session = Session::acquire(ctx).await?;
    let object = session
        .get(&KnownKind::Composition.gvk(), &ObjectKey::cluster(&reference.name))
        .await?;
    Ok(Some(Composition::from_object(object)?))
}

#[ComplexObject]
impl Composition {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }
}
