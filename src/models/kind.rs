//! Well-known resource kinds
//!
//! The Crossplane package and composition kinds plus the handful of core
//! kinds the API models directly. Everything else is classified
//! heuristically, see [`classify`](super::classify).

use std::fmt;
use std::str::FromStr;

use kube::core::GroupVersionKind;

/// Enumeration of every kind with a dedicated model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownKind {
    // Package manager
    Provider,
    ProviderRevision,
    Configuration,
    ConfigurationRevision,
    // Composition
    CompositeResourceDefinition,
    Composition,
    // API extensions
    CustomResourceDefinition,
    // Core
    Secret,
    ConfigMap,
    Event,
}

impl KnownKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownKind::Provider => "Provider",
            KnownKind::ProviderRevision => "ProviderRevision",
            KnownKind::Configuration => "Configuration",
            KnownKind::ConfigurationRevision => "ConfigurationRevision",
            KnownKind::CompositeResourceDefinition => "CompositeResourceDefinition",
            KnownKind::Composition => "Composition",
            KnownKind::CustomResourceDefinition => "CustomResourceDefinition",
            KnownKind::Secret => "Secret",
            KnownKind::ConfigMap => "ConfigMap",
            KnownKind::Event => "Event",
        }
    }

    /// API group the kind is served from (empty for the core group)
    pub fn group(&self) -> &'static str {
        match self {
            KnownKind::Provider
            | KnownKind::ProviderRevision
            | KnownKind::Configuration
            | KnownKind::ConfigurationRevision => "pkg.crossplane.io",
            KnownKind::CompositeResourceDefinition | KnownKind::Composition => {
                "apiextensions.crossplane.io"
            }
            KnownKind::CustomResourceDefinition => "apiextensions.k8s.io",
            KnownKind::Secret | KnownKind::ConfigMap | KnownKind::Event => "",
        }
    }

    /// Version the API reads and writes this kind at
    pub fn version(&self) -> &'static str {
        "v1"
    }

    pub fn api_version(&self) -> String {
        match self.group() {
            "" => self.version().to_string(),
            group => format!("{}/{}", group, self.version()),
        }
    }

    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(self.group(), self.version(), self.as_str())
    }

    /// Match an object's declared type against the known kinds.
    ///
    /// Only the group is compared, so any served version of a known kind
    /// still maps to its model.
    pub fn from_type(api_version: &str, kind: &str) -> Option<Self> {
        let known = Self::parse_optional(kind)?;
        let group = match api_version.split_once('/') {
            Some((group, _)) => group,
            None => "",
        };
        (group == known.group()).then_some(known)
    }

    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    pub fn all() -> &'static [Self] {
        &[
            KnownKind::Provider,
            KnownKind::ProviderRevision,
            KnownKind::Configuration,
            KnownKind::ConfigurationRevision,
            KnownKind::CompositeResourceDefinition,
            KnownKind::Composition,
            KnownKind::CustomResourceDefinition,
            KnownKind::Secret,
            KnownKind::ConfigMap,
            KnownKind::Event,
        ]
    }
}

impl fmt::Display for KnownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KnownKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownKind::all()
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown resource kind: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_round_trips() {
        for kind in KnownKind::all() {
            assert_eq!(KnownKind::parse_optional(kind.as_str()), Some(*kind));
        }
        assert_eq!(KnownKind::parse_optional("Bucket"), None);
    }

    #[test]
    fn test_api_version() {
        assert_eq!(KnownKind::Provider.api_version(), "pkg.crossplane.io/v1");
        assert_eq!(
            KnownKind::CustomResourceDefinition.api_version(),
            "apiextensions.k8s.io/v1"
        );
        assert_eq!(KnownKind::Secret.api_version(), "v1");
    }

    #[test]
    fn test_from_type_checks_group() {
        assert_eq!(
            KnownKind::from_type("pkg.crossplane.io/v1beta1", "Provider"),
            Some(KnownKind::Provider)
        );
        assert_eq!(KnownKind::from_type("v1", "Secret"), Some(KnownKind::Secret));
        // Same kind name in another group is not the Crossplane package.
        assert_eq!(
            KnownKind::from_type("notification.toolkit.fluxcd.io/v1beta3", "Provider"),
            None
        );
        assert_eq!(KnownKind::from_type("events.k8s.io/v1", "Event"), None);
    }
}
