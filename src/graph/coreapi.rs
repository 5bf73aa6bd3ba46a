//! Secrets, config maps and events

use std::collections::BTreeMap;

use async_graphql::{ComplexObject, Context, Json};

use super::context::Session;
use super::errors::{FieldError, recover};
use super::meta::select;
use crate::events;
use crate::models::{
    ConfigMap, Connection, Event, KnownKind, KubernetesResource, ObjectReference, Resource, Secret,
    model_object,
};

/// List every event in the cluster.
pub(crate) async fn list_events(
    ctx: &Context<'_>,
    session: &Session,
) -> Result<Vec<Event>, FieldError> {
    session.list_models::<Event>(ctx, KnownKind::Event).await
}

/// Events involving one object, newest first.
pub(crate) async fn object_events(ctx: &Context<'_>, target: ObjectReference) -> Connection<Event> {
    let result = async {
        let session = Session::acquire(ctx).await?;
        let listed = list_events(ctx, &session).await?;
        Ok::<_, FieldError>(events::for_object(listed, &target))
    };
    recover(ctx, result.await)
}

#[ComplexObject]
impl Secret {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }

    /// Decoded values, limited to `keys` when given.
    async fn data(&self, keys: Option<Vec<String>>) -> Json<BTreeMap<String, String>> {
        Json(select(&self.data, keys))
    }
}

#[ComplexObject]
impl ConfigMap {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }

    async fn data(&self, keys: Option<Vec<String>>) -> Json<BTreeMap<String, String>> {
        Json(select(&self.data, keys))
    }
}

#[ComplexObject]
impl Event {
    /// The object this event is about.
    async fn involved_object(&self, ctx: &Context<'_>) -> Option<KubernetesResource> {
        let result = async {
            let session = Session::acquire(ctx).await?;
            let object = session.get_ref(&self.involved).await?;
            Ok::<_, FieldError>(Some(model_object(object, &[])?))
        };
        recover(ctx, result.await)
    }
}
