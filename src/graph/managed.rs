//! Managed resource, provider config and generic resource fields

use async_graphql::{ComplexObject, Context};
use kube::core::GroupVersionKind;

use super::composites::get_secret;
use super::context::Session;
use super::coreapi::object_events;
use super::errors::{FieldError, recover};
use crate::kube::ObjectKey;
use crate::models::managed::ManagedResourceSpec;
use crate::models::{
    Connection, CustomResourceDefinition, Event, FromObject, GenericResource, KnownKind,
    ManagedResource, ProviderConfig, Resource, Secret, pick_version,
};

#[ComplexObject]
impl ManagedResource {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }
}

#[ComplexObject]
impl ManagedResourceSpec {
    async fn connection_secret(&self, ctx: &Context<'_>) -> Option<Secret> {
        let reference = self.write_connection_secret_to_ref.as_ref()?;
        recover(ctx, get_secret(ctx, &reference.namespace, &reference.name).await)
    }

    /// The provider config this resource authenticates with.
    async fn provider_config(&self, ctx: &Context<'_>) -> Option<ProviderConfig> {
        let reference = self.provider_config_ref.as_ref()?;
        recover(ctx, self.find_provider_config(ctx, &reference.name).await)
    }
}

impl ManagedResourceSpec {
    /// Provider configs are defined by the provider that defines the
    /// managed resource, in a group the managed resource's group ends with
    /// (`aws.upbound.io` for `s3.aws.upbound.io`). The closest such
    /// `ProviderConfig` CRD wins.
    async fn find_provider_config(
        &self,
        ctx: &Context<'_>,
        name: &str,
    ) -> Result<Option<ProviderConfig>, FieldError> {
        let session = Session::acquire(ctx).await?;
        let crds: Vec<CustomResourceDefinition> = session
            .list_models(ctx, KnownKind::CustomResourceDefinition)
            .await?;

        let Some(crd) = crds
            .iter()
            .filter(|crd| crd.spec.names.kind == "ProviderConfig")
            .filter(|crd| in_provider_group(&self.api_group, &crd.spec.group))
            .max_by_key(|crd| crd.spec.group.len())
        else {
            tracing::debug!("No ProviderConfig definition serves group {}", self.api_group);
            return Ok(None);
        };

        let version = pick_version(None, &crd.spec.version_entries());
        let gvk = GroupVersionKind::gvk(&crd.spec.group, &version, "ProviderConfig");
        let object = session.get(&gvk, &ObjectKey::cluster(name)).await?;
        Ok(Some(ProviderConfig::from_object(object)?))
    }
}

fn in_provider_group(resource_group: &str, config_group: &str) -> bool {
    resource_group == config_group
        || resource_group
            .strip_suffix(config_group)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[ComplexObject]
impl ProviderConfig {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }
}

#[ComplexObject]
impl GenericResource {
    async fn events(&self, ctx: &Context<'_>) -> Connection<Event> {
        object_events(ctx, self.reference()).await
    }
}
