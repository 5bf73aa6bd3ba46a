//! Resource tree walk
//!
//! Starting from a claim or composite resource, follow `spec.resourceRef`
//! and `spec.resourceRefs` breadth first. Each object is visited once, so
//! reference cycles terminate.

use std::collections::{HashSet, VecDeque};

use async_graphql::{Context, ID};
use kube::core::DynamicObject;
use serde_json::Value;

use super::context::Session;
use super::errors::{FieldError, record};
use crate::fieldpath;
use crate::models::{
    Connection, CrossplaneResourceTreeNode, KubernetesResource, ModelingError, ObjectReference,
    ReferenceId, model_object,
};

struct Walk {
    visited: HashSet<ReferenceId>,
    queue: VecDeque<(ObjectReference, ID)>,
    nodes: Vec<CrossplaneResourceTreeNode>,
}

impl Walk {
    fn new(root: ReferenceId) -> Self {
        Self {
            visited: HashSet::from([root]),
            queue: VecDeque::new(),
            nodes: Vec::new(),
        }
    }

    fn add(
        &mut self,
        resource: KubernetesResource,
        children: Vec<ObjectReference>,
        parent_id: Option<ID>,
    ) {
        let id = resource.reference().id();
        for child in children {
            if self.visited.insert(ReferenceId::from(&child)) {
                self.queue.push_back((child, id.clone()));
            }
        }
        self.nodes.push(CrossplaneResourceTreeNode { parent_id, resource });
    }
}

pub(crate) async fn walk(
    ctx: &Context<'_>,
    id: &ID,
) -> Result<Connection<CrossplaneResourceTreeNode>, FieldError> {
    let root = ReferenceId::decode(id)?;
    let session = Session::acquire(ctx).await?;

    let origin = root.to_reference();
    let object = session.get_ref(&origin).await?;
    let (resource, children) = expand(object)?;
    let mut walk = Walk::new(root);
    walk.add(resource, children, None);

    while let Some((reference, parent_id)) = walk.queue.pop_front() {
        let expanded = match session.get_ref(&reference).await {
            Ok(object) => expand(object).map_err(FieldError::from),
            Err(e) => Err(e),
        };
        match expanded {
            Ok((resource, children)) => walk.add(resource, children, Some(parent_id)),
            Err(e) => record(ctx, e),
        }
    }

    tracing::debug!("Resource tree of {} has {} nodes", origin, walk.nodes.len());
    Ok(Connection::new(walk.nodes))
}

/// Model an object and collect the references it points down to.
fn expand(
    object: DynamicObject,
) -> Result<(KubernetesResource, Vec<ObjectReference>), ModelingError> {
    let children = child_references(&object.data);
    let resource = model_object(object, &[])?;
    Ok((resource, children))
}

/// References held in `spec.resourceRef` and `spec.resourceRefs`. Malformed
/// entries are ignored.
pub(crate) fn child_references(data: &Value) -> Vec<ObjectReference> {
    let single = fieldpath::get(data, "spec.resourceRef").into_iter();
    let many = fieldpath::get(data, "spec.resourceRefs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten();
    single
        .chain(many)
        .filter_map(|v| serde_json::from_value::<ObjectReference>(v.clone()).ok())
        .filter(|r| !r.kind.is_empty() && !r.name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_child_references() {
        let claim = json!({
            "spec": {
                "resourceRef": {"apiVersion": "example.org/v1", "kind": "XBucket", "name": "b-x1"}
            }
        });
        let refs = child_references(&claim);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, "XBucket");
        assert_eq!(refs[0].namespace, "");

        let composite = json!({
            "spec": {"resourceRefs": [
                {"apiVersion": "s3.aws.upbound.io/v1beta1", "kind": "Bucket", "name": "b-1"},
                {"apiVersion": "s3.aws.upbound.io/v1beta1", "kind": "BucketPolicy"},
                "garbage"
            ]}
        });
        let refs = child_references(&composite);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "b-1");

        assert!(child_references(&json!({"spec": {}})).is_empty());
    }

    #[test]
    fn test_walk_skips_visited() {
        let root = ReferenceId::from(&ObjectReference::new("example.org/v1", "XBucket", "", "b"));
        let mut walk = Walk::new(root.clone());
        assert!(!walk.visited.insert(root));
        assert!(walk.queue.is_empty());
    }
}
