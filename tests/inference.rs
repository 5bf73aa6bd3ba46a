//! Version selection, ownership and revision activation on real objects

use crossgraph::models::inference::{Revision, is_owned_by};
use crossgraph::models::{
    CompositeResourceDefinition, FromObject, ProviderRevision, ReferenceId, active_revision,
    controller_of, pick_version,
};
use kube::core::DynamicObject;
use serde_json::{Value, json};

fn object(value: Value) -> DynamicObject {
    serde_json::from_value(value).unwrap()
}

fn xrd(versions: Value) -> CompositeResourceDefinition {
    CompositeResourceDefinition::from_object(object(json!({
        "apiVersion": "apiextensions.crossplane.io/v1",
        "kind": "CompositeResourceDefinition",
        "metadata": {"name": "xdatabases.example.org", "uid": "uid-xrd"},
        "spec": {
            "group": "example.org",
            "names": {"kind": "XDatabase", "plural": "xdatabases"},
            "versions": versions
        }
    })))
    .unwrap()
}

fn revision(name: &str, owners: Value, revision: i64, state: &str) -> ProviderRevision {
    ProviderRevision::from_object(object(json!({
        "apiVersion": "pkg.crossplane.io/v1",
        "kind": "ProviderRevision",
        "metadata": {"name": name, "uid": format!("uid-{}", name), "ownerReferences": owners},
        "spec": {
            "desiredState": state,
            "package": "xpkg.upbound.io/upbound/provider-aws:v1.0.0",
            "revision": revision
        }
    })))
    .unwrap()
}

fn owned_by(uid: &str, controller: bool) -> Value {
    json!([{
        "apiVersion": "pkg.crossplane.io/v1",
        "kind": "Provider",
        "name": "provider-aws",
        "uid": uid,
        "controller": controller
    }])
}

#[test]
fn test_xrd_referenceable_version_wins() {
    let definition = xrd(json!([
        {"name": "v2", "served": true, "referenceable": false},
        {"name": "v1", "served": true, "referenceable": true}
    ]));
    assert_eq!(pick_version(None, &definition.spec.version_entries()), "v1");
}

#[test]
fn test_xrd_served_version_fallback() {
    let definition = xrd(json!([
        {"name": "v3", "served": false, "referenceable": false},
        {"name": "v1", "served": true, "referenceable": false}
    ]));
    assert_eq!(pick_version(None, &definition.spec.version_entries()), "v1");
    assert_eq!(pick_version(Some("v3"), &definition.spec.version_entries()), "v3");
}

#[test]
fn test_xrd_without_usable_version() {
    let definition = xrd(json!([{"name": "v1", "served": false, "referenceable": false}]));
    assert_eq!(pick_version(None, &definition.spec.version_entries()), "");
}

#[test]
fn test_controller_among_owners() {
    let rev = revision(
        "provider-aws-1",
        json!([
            {"apiVersion": "v1", "kind": "ConfigMap", "name": "x", "uid": "X", "controller": false},
            {
                "apiVersion": "pkg.crossplane.io/v1",
                "kind": "Provider",
                "name": "provider-aws",
                "uid": "Y",
                "controller": true
            }
        ]),
        1,
        "Active",
    );
    let owners = rev.owner_references();
    assert_eq!(controller_of(owners).map(|o| o.uid.as_str()), Some("Y"));
    assert!(is_owned_by(owners, "X"));

    let uncontrolled = revision("provider-aws-2", json!([]), 2, "Active");
    assert!(controller_of(uncontrolled.owner_references()).is_none());
}

#[test]
fn test_active_revision_of_parent() {
    let revisions = vec![
        revision("provider-aws-1", owned_by("uid-aws", true), 1, "Inactive"),
        revision("provider-gcp-1", owned_by("uid-gcp", true), 1, "Active"),
        revision("provider-aws-2", owned_by("uid-aws", true), 2, "Active"),
        revision("provider-aws-3", owned_by("uid-aws", false), 3, "Active"),
    ];
    let active = active_revision(&revisions, "uid-aws").unwrap();
    assert_eq!(active.metadata.name, "provider-aws-2");
    assert_eq!(active.revision(), 2);
    assert!(active_revision(&revisions, "uid-none").is_none());
}

#[test]
fn test_reference_id_round_trip() {
    let id = ReferenceId {
        api_version: "example.org/v1alpha1".to_string(),
        kind: "Database".to_string(),
        namespace: "team-a".to_string(),
        name: "db".to_string(),
    };
    assert_eq!(ReferenceId::decode(&id.encode()).unwrap(), id);

    let cluster_scoped = ReferenceId {
        namespace: String::new(),
        ..id
    };
    let decoded = ReferenceId::decode(&cluster_scoped.encode()).unwrap();
    assert_eq!(decoded.to_reference().namespace, "");
}

#[test]
fn test_reference_id_rejects_garbage() {
    assert!(ReferenceId::decode("not base64!").is_err());
    assert!(ReferenceId::decode("djF8UG9k").is_err());
}
