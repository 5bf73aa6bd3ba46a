//! Object client abstraction
//!
//! Resolvers never talk to `kube::Api` directly. They go through
//! [`ObjectClient`], which the server backs with [`KubeObjectClient`] and
//! tests back with a mock.

use async_trait::async_trait;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};

use super::error::ClientError;

/// Namespace and name of a single object
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectKey {
    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Build a key where an empty namespace means cluster scoped.
    pub fn from_parts(namespace: &str, name: &str) -> Self {
        if namespace.is_empty() {
            Self::cluster(name)
        } else {
            Self::namespaced(namespace, name)
        }
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Read and write access to unstructured objects
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectClient: Send + Sync {
    async fn get(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
    ) -> Result<DynamicObject, ClientError>;

    /// List objects of a kind, across all namespaces when `namespace` is `None`.
    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<String>,
    ) -> Result<Vec<DynamicObject>, ClientError>;

    async fn create(&self, object: &DynamicObject) -> Result<DynamicObject, ClientError>;

    async fn update(&self, object: &DynamicObject) -> Result<DynamicObject, ClientError>;

    async fn delete(&self, object: &DynamicObject) -> Result<(), ClientError>;
}

/// [`ObjectClient`] backed by a live API server
#[derive(Clone)]
pub struct KubeObjectClient {
    client: kube::Client,
}

impl KubeObjectClient {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    fn api(&self, gvk: &GroupVersionKind, namespace: Option<&str>) -> Api<DynamicObject> {
        let resource = ApiResource::from_gvk(gvk);
        match namespace {
            Some(ns) if !ns.is_empty() => {
                Api::namespaced_with(self.client.clone(), ns, &resource)
            }
            _ => Api::all_with(self.client.clone(), &resource),
        }
    }

    fn api_for(&self, object: &DynamicObject) -> Result<(Api<DynamicObject>, String), ClientError> {
        let gvk = gvk_of(object)?;
        let name = object
            .metadata
            .name
            .clone()
            .ok_or_else(|| ClientError::Other("object has no metadata.name".to_string()))?;
        Ok((self.api(&gvk, object.metadata.namespace.as_deref()), name))
    }
}

/// The group, version and kind an object declares in its type meta.
pub fn gvk_of(object: &DynamicObject) -> Result<GroupVersionKind, ClientError> {
    let types = object
        .types
        .as_ref()
        .ok_or_else(|| ClientError::Other("object has no apiVersion or kind".to_string()))?;
    Ok(crate::models::gvk_for(&types.api_version, &types.kind))
}

#[async_trait]
impl ObjectClient for KubeObjectClient {
    async fn get(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
    ) -> Result<DynamicObject, ClientError> {
        tracing::debug!("Getting {} {}", gvk.kind, key);
        let api = self.api(gvk, key.namespace.as_deref());
        Ok(api.get(&key.name).await?)
    }

    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<String>,
    ) -> Result<Vec<DynamicObject>, ClientError> {
        let api = self.api(gvk, namespace.as_deref());
        let list = api.list(&ListParams::default()).await?;
        tracing::debug!("Listed {} {} objects", list.items.len(), gvk.kind);
        Ok(list.items)
    }

    async fn create(&self, object: &DynamicObject) -> Result<DynamicObject, ClientError> {
        let gvk = gvk_of(object)?;
        let api = self.api(&gvk, object.metadata.namespace.as_deref());
        Ok(api.create(&PostParams::default(), object).await?)
    }

    async fn update(&self, object: &DynamicObject) -> Result<DynamicObject, ClientError> {
        let (api, name) = self.api_for(object)?;
        Ok(api.replace(&name, &PostParams::default(), object).await?)
    }

    async fn delete(&self, object: &DynamicObject) -> Result<(), ClientError> {
        let (api, name) = self.api_for(object)?;
        api.delete(&name, &DeleteParams::default()).await?;
        Ok(())
    }
}
