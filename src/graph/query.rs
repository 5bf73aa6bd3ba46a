//! Query root

use async_graphql::{Context, ID, Object};

use super::context::{Session, model_each};
use super::coreapi::list_events;
use super::errors::{FieldError, record, recover};
use super::packages::list_revisions;
use super::tree;
use crate::events;
use crate::kube::ObjectKey;
use crate::models::inference::is_owned_by;
use crate::models::{
    CompositeResourceDefinition, Composition, ConfigMap, Configuration, ConfigurationRevision,
    Connection, CrossplaneResourceTreeNode, CustomResourceDefinition, Event, FromObject, KnownKind,
    KubernetesResource, Provider, ProviderRevision, ReferenceId, Resource, Secret,
    controller_of, gvk_for, model_object,
};

pub struct Query;

#[Object]
impl Query {
    /// Any object, by id.
    async fn kubernetes_resource(&self, ctx: &Context<'_>, id: ID) -> Option<KubernetesResource> {
        recover(ctx, get_resource(ctx, &id).await)
    }

    /// Objects of any kind. Unknown kinds are classified by shape alone.
    async fn kubernetes_resources(
        &self,
        ctx: &Context<'_>,
        api_version: String,
        kind: String,
        namespace: Option<String>,
    ) -> Connection<KubernetesResource> {
        recover(ctx, list_resources(ctx, &api_version, &kind, namespace).await)
    }

    /// Events involving the object with id `involved`, newest first. Without
    /// `involved`, the cluster-wide feed, oldest first and capped.
    async fn events(&self, ctx: &Context<'_>, involved: Option<ID>) -> Connection<Event> {
        recover(ctx, resolve_events(ctx, involved).await)
    }

    async fn secret(&self, ctx: &Context<'_>, namespace: String, name: String) -> Option<Secret> {
        let key = ObjectKey::namespaced(namespace, name);
        recover(ctx, get_known::<Secret>(ctx, KnownKind::Secret, key).await)
    }

    async fn config_map(
        &self,
        ctx: &Context<'_>,
        namespace: String,
        name: String,
    ) -> Option<ConfigMap> {
        let key = ObjectKey::namespaced(namespace, name);
        recover(ctx, get_known::<ConfigMap>(ctx, KnownKind::ConfigMap, key).await)
    }

    async fn providers(&self, ctx: &Context<'_>) -> Connection<Provider> {
        recover(ctx, list_known::<Provider>(ctx, KnownKind::Provider).await)
    }

    /// Provider revisions, optionally of one provider and only active or
    /// inactive ones.
    async fn provider_revisions(
        &self,
        ctx: &Context<'_>,
        provider: Option<ID>,
        active: Option<bool>,
    ) -> Connection<ProviderRevision> {
        let result = async {
            let parent = match provider {
                Some(id) => Some(uid_of(ctx, &id).await?),
                None => None,
            };
            list_revisions(ctx, KnownKind::ProviderRevision, parent.as_deref(), active).await
        };
        recover(ctx, result.await)
    }

    /// CRDs, optionally only those installed by one provider revision.
    async fn custom_resource_definitions(
        &self,
        ctx: &Context<'_>,
        revision: Option<ID>,
    ) -> Connection<CustomResourceDefinition> {
        let kind = KnownKind::CustomResourceDefinition;
        recover(ctx, list_owned::<CustomResourceDefinition>(ctx, kind, revision, None).await)
    }

    async fn configurations(&self, ctx: &Context<'_>) -> Connection<Configuration> {
        recover(ctx, list_known::<Configuration>(ctx, KnownKind::Configuration).await)
    }

    async fn configuration_revisions(
        &self,
        ctx: &Context<'_>,
        configuration: Option<ID>,
        active: Option<bool>,
    ) -> Connection<ConfigurationRevision> {
        let result = async {
            let parent = match configuration {
                Some(id) => Some(uid_of(ctx, &id).await?),
                None => None,
            };
            list_revisions(ctx, KnownKind::ConfigurationRevision, parent.as_deref(), active).await
        };
        recover(ctx, result.await)
    }

    /// XRDs, optionally only those installed by one configuration revision.
    /// `dangling` keeps only XRDs without (true) or with (false) a
    /// controlling owner.
    async fn composite_resource_definitions(
        &self,
        ctx: &Context<'_>,
        revision: Option<ID>,
        dangling: Option<bool>,
    ) -> Connection<CompositeResourceDefinition> {
        recover(
            ctx,
            list_owned::<CompositeResourceDefinition>(
                ctx,
                KnownKind::CompositeResourceDefinition,
                revision,
                dangling,
            )
            .await,
        )
    }

    async fn compositions(
        &self,
        ctx: &Context<'_>,
        revision: Option<ID>,
        dangling: Option<bool>,
    ) -> Connection<Composition> {
        recover(
            ctx,
            list_owned::<Composition>(ctx, KnownKind::Composition, revision, dangling).await,
        )
    }

    /// Walk from a claim or composite resource down to every composed
    /// resource, breadth first.
    async fn crossplane_resource_tree(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> Connection<CrossplaneResourceTreeNode> {
        recover(ctx, tree::walk(ctx, &id).await)
    }
}

async fn get_resource(
    ctx: &Context<'_>,
    id: &ID,
) -> Result<Option<KubernetesResource>, FieldError> {
    let reference = ReferenceId::decode(id)?.to_reference();
    let session = Session::acquire(ctx).await?;
    match session.get_opt(&reference.gvk(), &reference.key()).await? {
        Some(object) => Ok(Some(model_object(object, &[])?)),
        None => Ok(None),
    }
}

async fn get_known<T: FromObject>(
    ctx: &Context<'_>,
    kind: KnownKind,
    key: ObjectKey,
) -> Result<Option<T>, FieldError> {
    let session = Session::acquire(ctx).await?;
    match session.get_opt(&kind.gvk(), &key).await? {
        Some(object) => Ok(Some(T::from_object(object)?)),
        None => Ok(None),
    }
}

async fn list_known<T>(ctx: &Context<'_>, kind: KnownKind) -> Result<Connection<T>, FieldError>
where
    T: FromObject + async_graphql::OutputType,
{
    let session = Session::acquire(ctx).await?;
    let objects = session.list(&kind.gvk(), None).await?;
    let total = objects.len();
    Ok(Connection::with_total(model_each(ctx, objects), total))
}

async fn list_resources(
    ctx: &Context<'_>,
    api_version: &str,
    kind: &str,
    namespace: Option<String>,
) -> Result<Connection<KubernetesResource>, FieldError> {
    let session = Session::acquire(ctx).await?;
    let objects = session.list(&gvk_for(api_version, kind), namespace).await?;
    let total = objects.len();
    let mut nodes = Vec::with_capacity(total);
    for object in objects {
        match model_object(object, &[]) {
            Ok(resource) => nodes.push(resource),
            Err(e) => record(ctx, e.into()),
        }
    }
    Ok(Connection::with_total(nodes, total))
}

async fn resolve_events(
    ctx: &Context<'_>,
    involved: Option<ID>,
) -> Result<Connection<Event>, FieldError> {
    let session = Session::acquire(ctx).await?;
    let Some(id) = involved else {
        let listed = list_events(ctx, &session).await?;
        return Ok(events::capped(listed, session.settings().events));
    };

    let mut target = ReferenceId::decode(&id)?.to_reference();
    // The live object's uid pins events to this incarnation of it. Events
    // of an object that is already gone still match by identity.
    if let Some(object) = session.get_opt(&target.gvk(), &target.key()).await? {
        target.uid = object.metadata.uid.unwrap_or_default();
    }
    let listed = list_events(ctx, &session).await?;
    Ok(events::for_object(listed, &target))
}

/// Uid of the live object with the given id.
async fn uid_of(ctx: &Context<'_>, id: &ID) -> Result<String, FieldError> {
    let reference = ReferenceId::decode(id)?.to_reference();
    let session = Session::acquire(ctx).await?;
    let object = session.get_ref(&reference).await?;
    Ok(object.metadata.uid.unwrap_or_default())
}

/// List a kind, keeping objects owned by the revision with id `revision`
/// and, when `dangling` is set, objects without (true) or with (false) a
/// controller.
async fn list_owned<T>(
    ctx: &Context<'_>,
    kind: KnownKind,
    revision: Option<ID>,
    dangling: Option<bool>,
) -> Result<Connection<T>, FieldError>
where
    T: FromObject + Resource + async_graphql::OutputType,
{
    let owner_uid = match revision {
        Some(id) => Some(uid_of(ctx, &id).await?),
        None => None,
    };
    let session = Session::acquire(ctx).await?;
    let models: Vec<T> = session.list_models(ctx, kind).await?;
    let nodes: Vec<T> = models
        .into_iter()
        .filter(|m| {
            owner_uid.as_deref().is_none_or(|uid| is_owned_by(&m.meta().owner_references, uid))
        })
        .filter(|m| {
            dangling.is_none_or(|d| controller_of(&m.meta().owner_references).is_none() == d)
        })
        .collect();
    Ok(Connection::new(nodes))
}
