//! Version and ownership inference
//!
//! Small pure rules the resolvers lean on: which version of a CRD or XRD to
//! read objects at, who controls an object, and which package revision is
//! the active one.

use super::meta::OwnerReference;
use super::packages::PackageRevisionDesiredState;

/// One version a definition serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub name: String,
    pub served: bool,
    pub referenceable: bool,
}

/// Pick the version to read a definition's objects at.
///
/// A requested version is used as given, even if the definition does not
/// list it. Otherwise the first referenceable version wins, then the first
/// served one. With neither, the result is empty and the list it feeds
/// fails downstream.
pub fn pick_version(requested: Option<&str>, versions: &[VersionEntry]) -> String {
    if let Some(version) = requested {
        return version.to_string();
    }
    versions
        .iter()
        .find(|v| v.referenceable)
        .or_else(|| versions.iter().find(|v| v.served))
        .map(|v| v.name.clone())
        .unwrap_or_default()
}

/// The first owner reference marked as controller.
pub fn controller_of(owners: &[OwnerReference]) -> Option<&OwnerReference> {
    owners.iter().find(|o| o.controller)
}

/// Whether the controller of `owners` has the given uid.
pub fn is_controlled_by(owners: &[OwnerReference], uid: &str) -> bool {
    controller_of(owners).is_some_and(|c| c.uid == uid)
}

/// Whether any owner reference has the given uid.
pub fn is_owned_by(owners: &[OwnerReference], uid: &str) -> bool {
    owners.iter().any(|o| o.uid == uid)
}

/// Package revisions, as far as activation is concerned
pub trait Revision {
    fn desired_state(&self) -> PackageRevisionDesiredState;

    /// Monotonic revision number
    fn revision(&self) -> i64;

    fn owner_references(&self) -> &[OwnerReference];

    fn is_active(&self) -> bool {
        self.desired_state() == PackageRevisionDesiredState::Active
    }
}

/// The first revision in list order that is active and controlled by the
/// package with `parent_uid`.
pub fn active_revision<'a, R: Revision>(revisions: &'a [R], parent_uid: &str) -> Option<&'a R> {
    revisions
        .iter()
        .find(|r| r.is_active() && is_controlled_by(r.owner_references(), parent_uid))
}
