//! Heuristic classification of objects whose kind has no dedicated model
//!
//! Managed resources and provider configs are defined by provider CRDs, so
//! their kinds cannot be enumerated up front. They are recognised by the
//! categories of their CRD when those are known, and by shape otherwise.

use kube::core::DynamicObject;
use serde_json::Value;

use crate::fieldpath;

/// Which model an unknown-kind object maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    Managed,
    ProviderConfig,
    Composite,
    Claim,
    Generic,
}

/// Classify an object. First match wins:
///
/// 1. category `managed`, or a managed resource shape
/// 2. kind ending in `ProviderConfig` or `ProviderConfigUsage`, or category `provider`
/// 3. category `composite`, then category `claim`
/// 4. anything else is generic
pub fn classify(object: &DynamicObject, categories: &[String]) -> ResourceClass {
    let has = |category: &str| categories.iter().any(|c| c == category);
    let kind = object.types.as_ref().map(|t| t.kind.as_str()).unwrap_or_default();

    if has("managed") || looks_managed(&object.data) {
        ResourceClass::Managed
    } else if is_provider_config_kind(kind) || has("provider") {
        ResourceClass::ProviderConfig
    } else if has("composite") {
        ResourceClass::Composite
    } else if has("claim") {
        ResourceClass::Claim
    } else {
        ResourceClass::Generic
    }
}

/// Managed resources carry `spec.forProvider`, or a `spec.providerConfigRef`
/// without the `spec.resourceRef` that provider config usages also carry.
pub fn looks_managed(data: &Value) -> bool {
    let is_object = |path: &str| fieldpath::get(data, path).is_some_and(Value::is_object);
    is_object("spec.forProvider")
        || (is_object("spec.providerConfigRef")
            && fieldpath::get(data, "spec.resourceRef").is_none())
}

pub fn is_provider_config_kind(kind: &str) -> bool {
    kind.ends_with("ProviderConfig") || kind.ends_with("ProviderConfigUsage")
}

/// Category hints inferred from how Crossplane links composites and claims,
/// for walks that reach objects without knowing their CRD.
pub fn structural_categories(object: &DynamicObject) -> Vec<String> {
    let data = &object.data;
    if fieldpath::get(data, "spec.resourceRefs").is_some_and(Value::is_array)
        || (fieldpath::get(data, "spec.compositionRef").is_some()
            && object.metadata.namespace.is_none())
    {
        vec!["composite".to_string()]
    } else if fieldpath::get(data, "spec.resourceRef").is_some()
        && object.metadata.namespace.is_some()
    {
        vec!["claim".to_string()]
    } else {
        Vec::new()
    }
}
