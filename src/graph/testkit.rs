//! Fake cluster for resolver tests
//!
//! Holds a fixed set of objects and answers gets and lists from them
//! through a [`MockObjectClient`]. Tests add write expectations to the mock
//! themselves.

use std::sync::Arc;
use std::time::Duration;

use async_graphql::{Request, Variables};
use kube::core::{DynamicObject, GroupVersionKind};
use serde_json::Value;

use super::{CrossgraphSchema, Settings, build_schema};
use crate::kube::{
    ClientError, ClientFactory, MockClientFactory, MockObjectClient, ObjectClient, ObjectKey,
    RetryPolicy,
};

pub fn object(value: Value) -> DynamicObject {
    serde_json::from_value(value).unwrap()
}

/// Settings with a retry policy fast enough for tests
pub fn quick_settings() -> Settings {
    Settings {
        retry: RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            multiplier: 2.0,
        },
        ..Settings::default()
    }
}

fn matches_type(object: &DynamicObject, gvk: &GroupVersionKind) -> bool {
    let Some(types) = &object.types else {
        return false;
    };
    let group = types.api_version.split_once('/').map(|(g, _)| g).unwrap_or_default();
    types.kind == gvk.kind && group == gvk.group
}

#[derive(Default, Clone)]
pub struct FakeCluster {
    objects: Vec<DynamicObject>,
    get_failures: Vec<(String, ClientError)>,
    list_failures: Vec<(String, ClientError)>,
}

impl FakeCluster {
    pub fn new(objects: Vec<Value>) -> Self {
        Self {
            objects: objects.into_iter().map(object).collect(),
            ..Self::default()
        }
    }

    /// Make every get of the named object fail.
    pub fn fail_get(mut self, name: &str, error: ClientError) -> Self {
        self.get_failures.push((name.to_string(), error));
        self
    }

    /// Make every list of a kind fail.
    pub fn fail_list(mut self, kind: &str, error: ClientError) -> Self {
        self.list_failures.push((kind.to_string(), error));
        self
    }

    /// A mock answering gets and lists from this cluster.
    pub fn mock(&self) -> MockObjectClient {
        let mut client = MockObjectClient::new();

        let cluster = self.clone();
        client.expect_get().returning(move |gvk, key| cluster.get(gvk, key));

        let cluster = self.clone();
        client
            .expect_list()
            .returning(move |gvk, namespace| cluster.list(gvk, namespace.as_deref()));

        client
    }

    fn get(&self, gvk: &GroupVersionKind, key: &ObjectKey) -> Result<DynamicObject, ClientError> {
        if let Some((_, e)) = self.get_failures.iter().find(|(name, _)| *name == key.name) {
            return Err(e.clone());
        }
        self.objects
            .iter()
            .find(|o| {
                matches_type(o, gvk)
                    && o.metadata.name.as_deref() == Some(key.name.as_str())
                    && o.metadata.namespace == key.namespace
            })
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("{} {}", gvk.kind, key)))
    }

    fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, ClientError> {
        if let Some((_, e)) = self.list_failures.iter().find(|(kind, _)| *kind == gvk.kind) {
            return Err(e.clone());
        }
        Ok(self
            .objects
            .iter()
            .filter(|o| matches_type(o, gvk))
            .filter(|o| namespace.is_none_or(|ns| o.metadata.namespace.as_deref() == Some(ns)))
            .cloned()
            .collect())
    }

    pub fn schema(&self) -> CrossgraphSchema {
        schema_with(self.mock())
    }
}

/// Schema whose every request gets `client`.
pub fn schema_with(client: MockObjectClient) -> CrossgraphSchema {
    let client: Arc<dyn ObjectClient> = Arc::new(client);
    let mut factory = MockClientFactory::new();
    factory
        .expect_client()
        .returning(move |_| Ok(client.clone()));
    let factory: Arc<dyn ClientFactory> = Arc::new(factory);
    build_schema(factory, quick_settings())
}

/// Execute a document and return the whole response as JSON.
pub async fn run(schema: &CrossgraphSchema, query: &str) -> Value {
    run_with(schema, query, Value::Null).await
}

pub async fn run_with(schema: &CrossgraphSchema, query: &str, variables: Value) -> Value {
    let request = Request::new(query).variables(Variables::from_json(variables));
    let response = schema.execute(request).await;
    serde_json::to_value(&response).unwrap()
}

/// `extensions.code` of every error in a response
pub fn error_codes(response: &Value) -> Vec<String> {
    response["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["extensions"]["code"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn provider(name: &str, uid: &str) -> Value {
    serde_json::json!({
        "apiVersion": "pkg.crossplane.io/v1",
        "kind": "Provider",
        "metadata": {"name": name, "uid": uid},
        "spec": {"package": format!("xpkg.upbound.io/upbound/{}:v1.0.0", name)}
    })
}

pub fn provider_revision(
    name: &str,
    uid: &str,
    owner: (&str, &str),
    revision: i64,
    active: bool,
) -> Value {
    serde_json::json!({
        "apiVersion": "pkg.crossplane.io/v1",
        "kind": "ProviderRevision",
        "metadata": {
            "name": name,
            "uid": uid,
            "ownerReferences": [{
                "apiVersion": "pkg.crossplane.io/v1",
                "kind": "Provider",
                "name": owner.0,
                "uid": owner.1,
                "controller": true
            }]
        },
        "spec": {
            "desiredState": if active { "Active" } else { "Inactive" },
            "package": "xpkg.upbound.io/upbound/provider-aws:v1.0.0",
            "revision": revision
        }
    })
}

pub fn bucket(name: &str) -> Value {
    serde_json::json!({
        "apiVersion": "s3.aws.upbound.io/v1beta1",
        "kind": "Bucket",
        "metadata": {"name": name, "uid": format!("uid-{}", name)},
        "spec": {"forProvider": {"region": "us-east-1"}, "providerConfigRef": {"name": "default"}}
    })
}

pub fn bucket_ref(name: &str) -> Value {
    serde_json::json!({"apiVersion": "s3.aws.upbound.io/v1beta1", "kind": "Bucket", "name": name})
}

pub fn composite(name: &str, resource_refs: Vec<Value>) -> Value {
    serde_json::json!({
        "apiVersion": "example.org/v1alpha1",
        "kind": "XBucket",
        "metadata": {"name": name, "uid": format!("uid-{}", name)},
        "spec": {
            "compositionRef": {"name": "xbuckets"},
            "claimRef": {
                "apiVersion": "example.org/v1alpha1",
                "kind": "Bucket",
                "namespace": "team-a",
                "name": "data"
            },
            "resourceRefs": resource_refs
        }
    })
}

pub fn claim(name: &str, namespace: &str, composite_name: &str) -> Value {
    serde_json::json!({
        "apiVersion": "example.org/v1alpha1",
        "kind": "Bucket",
        "metadata": {"name": name, "namespace": namespace, "uid": format!("uid-{}", name)},
        "spec": {
            "resourceRef": {
                "apiVersion": "example.org/v1alpha1",
                "kind": "XBucket",
                "name": composite_name
            }
        }
    })
}

pub fn event(
    name: &str,
    involved: (&str, &str, &str),
    uid: &str,
    event_type: &str,
    at: &str,
) -> Value {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Event",
        "metadata": {"name": name, "namespace": "default"},
        "involvedObject": {
            "apiVersion": involved.0,
            "kind": involved.1,
            "name": involved.2,
            "uid": uid
        },
        "type": event_type,
        "reason": "Synced",
        "message": name,
        "lastTimestamp": at
    })
}
