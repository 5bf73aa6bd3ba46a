//! Provider and configuration fields

use async_graphql::{ComplexObject, Context, OutputType};
use futures::future::join_all;

use super::context::Session;
use super::coreapi::object_events;
use super::errors::{FieldError, record, recover};
use crate::models::inference::{Revision, is_controlled_by};
use crate::models::packages::{ConfigurationRevisionStatus, ProviderRevisionStatus};
use crate::models::{
    Configuration, ConfigurationRevision, Connection, Event, FromObject, KnownKind,
    KubernetesResource, ObjectReference, Provider, ProviderRevision, Resource, active_revision,
    model_object,
};

/// Kinds a provider revision installs that the API surfaces
const PROVIDER_REVISION_OBJECTS: &[KnownKind] = &[KnownKind::CustomResourceDefinition];

/// Kinds a configuration revision installs that the API surfaces
const CONFIGURATION_REVISION_OBJECTS: &[KnownKind] =
    &[KnownKind::CompositeResourceDefinition, KnownKind::Composition];

/// Revisions of one kind, optionally limited to those controlled by
/// `parent_uid` and to active or inactive ones, ordered by revision number.
pub(crate) async fn list_revisions<R>(
    ctx: &Context<'_>,
    kind: KnownKind,
    parent_uid: Option<&str>,
    active: Option<bool>,
) -> Result<Connection<R>, FieldError>
where
    R: FromObject + Revision + OutputType,
{
    let session = Session::acquire(ctx).await?;
    let revisions: Vec<R> = session.list_models(ctx, kind).await?;
    let mut nodes: Vec<R> = revisions
        .into_iter()
        .filter(|r| parent_uid.is_none_or(|uid| is_controlled_by(r.owner_references(), uid)))
        .filter(|r| active.is_none_or(|a| r.is_active() == a))
        .collect();
    nodes.sort_by_key(|r| r.revision());
    Ok(Connection::new(nodes))
}

async fn find_active_revision<R>(
    ctx: &Context<'_>,
    kind: KnownKind,
    parent_uid: &str,
) -> Result<Option<R>, FieldError>
where
    R: FromObject + Revision + Clone,
{
    let session = Session::acquire(ctx).await?;
    let revisions: Vec<R> = session.list_models(ctx, kind).await?;
    Ok(active_revision(&revisions, parent_uid).cloned())
}

/// Fetch the objects a revision installed, one concurrent get per
/// reference. Kinds outside `allowed` are skipped. Results keep reference
/// order; failed gets are recorded and left out.
async fn revision_objects(
    ctx: &Context<'_>,
    refs: &[ObjectReference],
    allowed: &[KnownKind],
) -> Result<Connection<KubernetesResource>, FieldError> {
    let wanted: Vec<&ObjectReference> = refs
        .iter()
        .filter(|r| {
            KnownKind::from_type(&r.api_version, &r.kind).is_some_and(|k| allowed.contains(&k))
        })
        .collect();
    if wanted.is_empty() {
        return Ok(Connection::default());
    }

    let session = Session::acquire(ctx).await?;
    let fetched = join_all(wanted.iter().map(|r| session.get_ref(r))).await;

    let mut nodes = Vec::with_capacity(fetched.len());
    for result in fetched {
        match result.and_then(|object| model_object(object, &[]).map_err(FieldError::from)) {
            Ok(resource) => nodes.push(resource),
            Err(e) => record(ctx, e),
        }
    }
    Ok(Connection::new(nodes))
}

#[ComplexObject]
impl Provider {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }

    /// Revisions controlled by this provider, oldest first.
    async fn revisions(
        &self,
        ctx: &Context<'_>,
        active: Option<bool>,
    ) -> Connection<ProviderRevision> {
        let owner = Some(self.metadata.uid.as_str());
        recover(ctx, list_revisions(ctx, KnownKind::ProviderRevision, owner, active).await)
    }

    async fn active_revision(&self, ctx: &Context<'_>) -> Option<ProviderRevision> {
        recover(
            ctx,
            find_active_revision(ctx, KnownKind::ProviderRevision, &self.metadata.uid).await,
        )
    }
}

#[ComplexObject]
impl ProviderRevision {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }
}

#[ComplexObject]
impl ProviderRevisionStatus {
    /// CustomResourceDefinitions installed by the revision.
    async fn objects(&self, ctx: &Context<'_>) -> Connection<KubernetesResource> {
        recover(
            ctx,
            revision_objects(ctx, &self.object_refs, PROVIDER_REVISION_OBJECTS).await,
        )
    }
}

#[ComplexObject]
impl Configuration {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }

    /// Revisions controlled by this configuration, oldest first.
    async fn revisions(
        &self,
        ctx: &Context<'_>,
        active: Option<bool>,
    ) -> Connection<ConfigurationRevision> {
        recover(
            ctx,
            list_revisions(
                ctx,
                KnownKind::ConfigurationRevision,
                Some(&self.metadata.uid),
                active,
            )
            .await,
        )
    }

    async fn active_revision(&self, ctx: &Context<'_>) -> Option<ConfigurationRevision> {
        recover(
            ctx,
            find_active_revision(ctx, KnownKind::ConfigurationRevision, &self.metadata.uid).await,
        )
    }
}

#[ComplexObject]
impl ConfigurationRevision {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }
}

#[ComplexObject]
impl ConfigurationRevisionStatus {
    /// CompositeResourceDefinitions and Compositions installed by the revision.
    async fn objects(&self, ctx: &Context<'_>) -> Connection<KubernetesResource> {
        recover(
            ctx,
            revision_objects(ctx, &self.object_refs, CONFIGURATION_REVISION_OBJECTS).await,
        )
    }
}
