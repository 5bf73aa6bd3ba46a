//! Reading and writing unstructured objects by field path

use crossgraph::fieldpath::{self, FieldPathError, Segment};
use serde_json::json;

#[test]
fn test_parse_mixed_path() {
    assert_eq!(
        fieldpath::parse("spec.forProvider.tags[2].key").unwrap(),
        vec![
            Segment::Field("spec".to_string()),
            Segment::Field("forProvider".to_string()),
            Segment::Field("tags".to_string()),
            Segment::Index(2),
            Segment::Field("key".to_string()),
        ]
    );
}

#[test]
fn test_bracketed_keys_may_contain_dots() {
    let segments = fieldpath::parse("metadata.labels[app.kubernetes.io/name]").unwrap();
    assert_eq!(
        segments.last(),
        Some(&Segment::Field("app.kubernetes.io/name".to_string()))
    );
}

#[test]
fn test_malformed_paths() {
    assert_eq!(fieldpath::parse(""), Err(FieldPathError::Empty));
    assert!(matches!(
        fieldpath::parse("spec..x"),
        Err(FieldPathError::EmptyField { .. })
    ));
    assert!(matches!(
        fieldpath::parse("spec.tags[0"),
        Err(FieldPathError::Unterminated { .. })
    ));
    assert!(matches!(
        fieldpath::parse("spec.tags[]"),
        Err(FieldPathError::EmptyBrackets { .. })
    ));
    assert!(matches!(
        fieldpath::parse("spec.tags[0]x"),
        Err(FieldPathError::Unexpected { found: 'x', .. })
    ));
    assert!(matches!(
        fieldpath::parse("spec."),
        Err(FieldPathError::EmptyField { .. })
    ));
}

#[test]
fn test_get_reads_nested_values() {
    let object = json!({
        "metadata": {"annotations": {"crossplane.io/external-name": "bucket-123"}},
        "spec": {"resourceRefs": [{"kind": "Bucket"}, {"kind": "Role"}]}
    });
    assert_eq!(
        fieldpath::get_str(&object, "metadata.annotations[crossplane.io/external-name]"),
        Some("bucket-123")
    );
    assert_eq!(fieldpath::get_str(&object, "spec.resourceRefs[1].kind"), Some("Role"));
    assert_eq!(fieldpath::get(&object, "spec.resourceRefs[5]"), None);
    assert_eq!(fieldpath::get(&object, "spec.resourceRefs.kind"), None);
}

#[test]
fn test_set_creates_intermediates() {
    let mut object = json!({"apiVersion": "example.org/v1alpha1", "kind": "XBucket"});
    fieldpath::set(&mut object, "spec.x", json!(5)).unwrap();
    fieldpath::set(&mut object, "spec.parameters.tags[1]", json!("prod")).unwrap();
    fieldpath::set(&mut object, "metadata.labels[team.example.org/owner]", json!("data")).unwrap();

    assert_eq!(object["spec"]["x"], json!(5));
    assert_eq!(object["spec"]["parameters"]["tags"], json!([null, "prod"]));
    assert_eq!(object["metadata"]["labels"]["team.example.org/owner"], json!("data"));
}

#[test]
fn test_set_overwrites_and_refuses_scalars() {
    let mut object = json!({"spec": {"x": 1, "name": "bucket"}});
    fieldpath::set(&mut object, "spec.x", json!({"nested": true})).unwrap();
    assert_eq!(object["spec"]["x"]["nested"], json!(true));

    let err = fieldpath::set(&mut object, "spec.name.first", json!("a")).unwrap_err();
    assert!(matches!(err, FieldPathError::NotAnObject { .. }));

    let err = fieldpath::set(&mut object, "spec[0]", json!("a")).unwrap_err();
    assert!(matches!(err, FieldPathError::NotAnArray { .. }));
}
