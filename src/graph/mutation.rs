//! Mutation root

use async_graphql::{Context, ID, InputObject, Json, Object, SimpleObject};
use kube::core::DynamicObject;
use serde_json::Value;

use super::context::{Session, WriteOp};
use super::errors::{FieldError, recover};
use crate::fieldpath;
use crate::models::{KubernetesResource, ObjectReference, ReferenceId, model_object};

/// A value to write into the object at a field path before it is sent
#[derive(Debug, Clone, InputObject)]
pub struct PatchInput {
    /// e.g. `spec.forProvider.tags[0]` or `metadata.labels[app.kubernetes.io/name]`
    pub field_path: String,
    pub unstructured: Json<Value>,
}

#[derive(Debug, Clone, InputObject)]
pub struct KubernetesResourceInput {
    /// The whole object as JSON
    pub unstructured: Json<Value>,
    /// Applied in order; a later patch to the same path wins.
    pub patches: Option<Vec<PatchInput>>,
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct KubernetesResourcePayload {
    pub resource: Option<KubernetesResource>,
}

pub struct Mutation;

#[Object]
impl Mutation {
    async fn create_kubernetes_resource(
        &self,
        ctx: &Context<'_>,
        input: KubernetesResourceInput,
    ) -> KubernetesResourcePayload {
        recover(ctx, create(ctx, input).await)
    }

    /// Replace the object with id `id`. Type and name missing from the input
    /// are taken from the id.
    async fn update_kubernetes_resource(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: KubernetesResourceInput,
    ) -> KubernetesResourcePayload {
        recover(ctx, update(ctx, &id, input).await)
    }

    /// Delete the object with id `id`. Deleting an object that does not
    /// exist succeeds with a null resource.
    async fn delete_kubernetes_resource(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> KubernetesResourcePayload {
        recover(ctx, delete(ctx, &id).await)
    }
}

async fn create(
    ctx: &Context<'_>,
    input: KubernetesResourceInput,
) -> Result<KubernetesResourcePayload, FieldError> {
    let object = prepare(input, None)?;
    let session = Session::acquire(ctx).await?;
    let written = session.write(WriteOp::Create, &object).await?;
    payload(written)
}

async fn update(
    ctx: &Context<'_>,
    id: &ID,
    input: KubernetesResourceInput,
) -> Result<KubernetesResourcePayload, FieldError> {
    let identity = ReferenceId::decode(id)?.to_reference();
    let object = prepare(input, Some(&identity))?;
    let session = Session::acquire(ctx).await?;
    let written = session.write(WriteOp::Update, &object).await?;
    payload(written)
}

async fn delete(ctx: &Context<'_>, id: &ID) -> Result<KubernetesResourcePayload, FieldError> {
    let reference = ReferenceId::decode(id)?.to_reference();
    let session = Session::acquire(ctx).await?;
    let Some(object) = session.get_opt(&reference.gvk(), &reference.key()).await? else {
        tracing::debug!("{} is already gone", reference);
        return Ok(KubernetesResourcePayload::default());
    };
    session.write(WriteOp::Delete, &object).await?;
    payload(Some(object))
}

fn payload(object: Option<DynamicObject>) -> Result<KubernetesResourcePayload, FieldError> {
    let resource = object.map(|o| model_object(o, &[])).transpose()?;
    Ok(KubernetesResourcePayload { resource })
}

/// Build the object to write: the input JSON, identity filled from `id`
/// where missing, then every patch in order.
pub(crate) fn prepare(
    input: KubernetesResourceInput,
    identity: Option<&ObjectReference>,
) -> Result<DynamicObject, FieldError> {
    let Json(mut raw) = input.unstructured;
    if !raw.is_object() {
        return Err(FieldError::InvalidInput(
            "unstructured must be a JSON object".to_string(),
        ));
    }

    if let Some(identity) = identity {
        fill(&mut raw, "apiVersion", &identity.api_version)?;
        fill(&mut raw, "kind", &identity.kind)?;
        fill(&mut raw, "metadata.name", &identity.name)?;
        if !identity.namespace.is_empty() {
            fill(&mut raw, "metadata.namespace", &identity.namespace)?;
        }
    }

    for patch in input.patches.unwrap_or_default() {
        fieldpath::set(&mut raw, &patch.field_path, patch.unstructured.0)?;
    }

    let object: DynamicObject = serde_json::from_value(raw)
        .map_err(|e| FieldError::InvalidInput(format!("cannot decode object: {}", e)))?;
    if object.types.is_none() {
        return Err(FieldError::InvalidInput(
            "object has no apiVersion and kind".to_string(),
        ));
    }
    Ok(object)
}

fn fill(raw: &mut Value, path: &str, value: &str) -> Result<(), FieldError> {
    if fieldpath::get_str(raw, path).is_some_and(|s| !s.is_empty()) {
        return Ok(());
    }
    fieldpath::set(raw, path, Value::String(value.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testkit::*;
    use crate::kube::ClientError;
    use serde_json::json;

    fn input(unstructured: Value, patches: Vec<(&str, Value)>) -> KubernetesResourceInput {
        KubernetesResourceInput {
            unstructured: Json(unstructured),
            patches: Some(
                patches
                    .into_iter()
                    .map(|(path, value)| PatchInput {
                        field_path: path.to_string(),
                        unstructured: Json(value),
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_prepare_applies_patches_in_order() {
        let object = prepare(
            input(
                json!({"apiVersion": "example.org/v1", "kind": "Thing", "metadata": {"name": "t"}}),
                vec![("spec.x", json!(4)), ("spec.x", json!(5)), ("spec.tags[1]", json!("b"))],
            ),
            None,
        )
        .unwrap();
        assert_eq!(object.data["spec"]["x"], json!(5));
        assert_eq!(object.data["spec"]["tags"], json!([null, "b"]));
    }

    #[test]
    fn test_prepare_fills_identity() {
        let identity = ObjectReference::new("v1", "ConfigMap", "default", "settings");
        let object = prepare(input(json!({"data": {"a": "1"}}), vec![]), Some(&identity)).unwrap();
        let types = object.types.unwrap();
        assert_eq!(types.api_version, "v1");
        assert_eq!(types.kind, "ConfigMap");
        assert_eq!(object.metadata.name.as_deref(), Some("settings"));
        assert_eq!(object.metadata.namespace.as_deref(), Some("default"));
    }

    #[test]
    fn test_prepare_keeps_given_identity() {
        let identity = ObjectReference::new("v1", "ConfigMap", "default", "settings");
        let object = prepare(
            input(
                json!({"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "renamed"}}),
                vec![],
            ),
            Some(&identity),
        )
        .unwrap();
        assert_eq!(object.metadata.name.as_deref(), Some("renamed"));
    }

    #[test]
    fn test_prepare_rejects_bad_input() {
        let err = prepare(input(json!([1, 2]), vec![]), None).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        let err = prepare(input(json!({"metadata": {"name": "t"}}), vec![]), None).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        let err = prepare(
            input(
                json!({"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "t"}}),
                vec![("metadata.name.first", json!("x"))],
            ),
            None,
        )
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn test_prepare_rejects_huge_patch_index() {
        for path in ["spec.x[18446744073709551615]", "spec.x[4000000000]"] {
            let err = prepare(
                input(
                    json!({"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "t"}}),
                    vec![(path, json!(1))],
                ),
                None,
            )
            .unwrap_err();
            assert_eq!(err.code(), "INVALID_INPUT", "{}", path);
        }
    }

    const CREATE: &str = r#"mutation Create($input: KubernetesResourceInput!) {
        createKubernetesResource(input: $input) {
            resource { ... on GenericResource { unstructured } }
        }
    }"#;

    fn thing() -> Value {
        json!({
            "unstructured": {
                "apiVersion": "example.org/v1",
                "kind": "Thing",
                "metadata": {"name": "t"}
            },
            "patches": [{"fieldPath": "spec.x", "unstructured": 5}]
        })
    }

    #[tokio::test]
    async fn test_create_with_patch() {
        let mut client = FakeCluster::default().mock();
        client
            .expect_create()
            .withf(|o| o.data["spec"]["x"] == json!(5))
            .times(1)
            .returning(|o| Ok(o.clone()));

        let response = run_with(&schema_with(client), CREATE, json!({"input": thing()})).await;
        let created = &response["data"]["createKubernetesResource"]["resource"]["unstructured"];
        assert_eq!(created["spec"]["x"], 5);
        assert_eq!(created["metadata"]["name"], "t");
        assert!(error_codes(&response).is_empty());
    }

    #[tokio::test]
    async fn test_create_retries_throttling() {
        let mut client = FakeCluster::default().mock();
        let mut calls = 0;
        client.expect_create().times(2).returning(move |o| {
            calls += 1;
            if calls == 1 {
                Err(ClientError::TooManyRequests("slow down".to_string()))
            } else {
                Ok(o.clone())
            }
        });

        let response = run_with(&schema_with(client), CREATE, json!({"input": thing()})).await;
        assert!(error_codes(&response).is_empty());
        assert_eq!(
            response["data"]["createKubernetesResource"]["resource"]["unstructured"]["spec"]["x"],
            5
        );
    }

    #[tokio::test]
    async fn test_create_with_huge_patch_index_is_invalid_input() {
        let mut client = FakeCluster::default().mock();
        client.expect_create().never();

        let input = json!({
            "unstructured": {
                "apiVersion": "example.org/v1",
                "kind": "Thing",
                "metadata": {"name": "t"}
            },
            "patches": [{"fieldPath": "spec.tags[18446744073709551615]", "unstructured": "x"}]
        });
        let response = run_with(&schema_with(client), CREATE, json!({"input": input})).await;
        assert!(response["data"]["createKubernetesResource"]["resource"].is_null());
        assert_eq!(error_codes(&response), vec!["INVALID_INPUT"]);
    }

    #[tokio::test]
    async fn test_update_conflict_is_not_retried() {
        let mut client = FakeCluster::default().mock();
        client
            .expect_update()
            .times(1)
            .returning(|_| Err(ClientError::Conflict("object has been modified".to_string())));

        let id = ObjectReference::new("example.org/v1", "Thing", "", "t").id();
        let query = r#"mutation Update($id: ID!, $input: KubernetesResourceInput!) {
            updateKubernetesResource(id: $id, input: $input) { resource { __typename } }
        }"#;
        let response = run_with(
            &schema_with(client),
            query,
            json!({"id": id.to_string(), "input": {"unstructured": {"spec": {"x": 1}}}}),
        )
        .await;
        assert!(response["data"]["updateKubernetesResource"]["resource"].is_null());
        assert_eq!(error_codes(&response), vec!["WRITE"]);
        assert_eq!(response["errors"][0]["extensions"]["retriable"], false);
    }

    #[tokio::test]
    async fn test_update_gives_up_after_max_attempts() {
        let mut client = FakeCluster::default().mock();
        client
            .expect_update()
            .times(3)
            .returning(|_| Err(ClientError::InternalError("etcd unavailable".to_string())));

        let id = ObjectReference::new("example.org/v1", "Thing", "", "t").id();
        let query = r#"mutation Update($id: ID!, $input: KubernetesResourceInput!) {
            updateKubernetesResource(id: $id, input: $input) { resource { __typename } }
        }"#;
        let response = run_with(
            &schema_with(client),
            query,
            json!({"id": id.to_string(), "input": {"unstructured": {}}}),
        )
        .await;
        assert_eq!(error_codes(&response), vec!["WRITE"]);
        assert_eq!(response["errors"][0]["extensions"]["retriable"], true);
    }

    #[tokio::test]
    async fn test_delete_missing_object_succeeds() {
        let mut client = FakeCluster::default().mock();
        client.expect_delete().never();

        let id = ObjectReference::new("v1", "ConfigMap", "default", "gone").id();
        let query = format!(
            r#"mutation {{ deleteKubernetesResource(id: "{}") {{ resource {{ __typename }} }} }}"#,
            id.as_str()
        );
        let response = run(&schema_with(client), &query).await;
        assert!(response["data"]["deleteKubernetesResource"]["resource"].is_null());
        assert!(error_codes(&response).is_empty());
    }

    #[tokio::test]
    async fn test_delete_returns_deleted_object() {
        let cluster = FakeCluster::new(vec![json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "settings", "namespace": "default"},
            "data": {"a": "1"}
        })]);
        let mut client = cluster.mock();
        client
            .expect_delete()
            .withf(|o| o.metadata.name.as_deref() == Some("settings"))
            .times(1)
            .returning(|_| Ok(()));

        let id = ObjectReference::new("v1", "ConfigMap", "default", "settings").id();
        let query = format!(
            r#"mutation {{ deleteKubernetesResource(id: "{}") {{ resource {{ __typename }} }} }}"#,
            id.as_str()
        );
        let response = run(&schema_with(client), &query).await;
        assert_eq!(
            response["data"]["deleteKubernetesResource"]["resource"]["__typename"],
            "ConfigMap"
        );
    }

    #[tokio::test]
    async fn test_delete_of_object_removed_meanwhile_succeeds() {
        let cluster = FakeCluster::new(vec![json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "settings", "namespace": "default"}
        })]);
        let mut client = cluster.mock();
        client
            .expect_delete()
            .times(1)
            .returning(|_| {
                Err(ClientError::NotFound("configmaps \"settings\" not found".to_string()))
            });

        let id = ObjectReference::new("v1", "ConfigMap", "default", "settings").id();
        let query = format!(
            r#"mutation {{ deleteKubernetesResource(id: "{}") {{ resource {{ __typename }} }} }}"#,
            id.as_str()
        );
        let response = run(&schema_with(client), &query).await;
        assert!(error_codes(&response).is_empty());
        assert_eq!(
            response["data"]["deleteKubernetesResource"]["resource"]["__typename"],
            "ConfigMap"
        );
    }
}
