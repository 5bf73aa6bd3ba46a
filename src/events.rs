//! Event aggregation
//!
//! Two views over a listed set of events: every event involving one object,
//! newest first, and a capped cluster-wide feed, oldest first, that stops
//! once enough warnings have been collected.

use crate::models::{Connection, Event, ObjectReference};

/// Bounds on the cluster-wide event feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLimits {
    /// Stop once this many warnings are in the output
    pub target: usize,
    /// Never return more than this many events
    pub cap: usize,
}

impl Default for EventLimits {
    fn default() -> Self {
        Self {
            target: 500,
            cap: 1000,
        }
    }
}

/// Whether `event` is about the object `target` points at.
///
/// A uid on the target is authoritative. Without one, apiVersion, kind,
/// namespace and name must all match, which also matches events of an
/// earlier object that had the same identity.
pub fn involves(event: &Event, target: &ObjectReference) -> bool {
    let involved = &event.involved;
    if !target.uid.is_empty() {
        return involved.uid == target.uid;
    }
    involved.api_version == target.api_version
        && involved.kind == target.kind
        && involved.namespace == target.namespace
        && involved.name == target.name
}

/// Events involving `target`, most recent first.
pub fn for_object(
    events: impl IntoIterator<Item = Event>,
    target: &ObjectReference,
) -> Connection<Event> {
    let mut nodes: Vec<Event> = events.into_iter().filter(|e| involves(e, target)).collect();
    // Stable, so events with equal timestamps keep their listed order.
    nodes.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    Connection::new(nodes)
}

/// The cluster-wide feed, oldest first.
///
/// Walks events in ascending time order and stops when the output holds
/// `cap` events or `target` warnings. The total count is every listed event.
pub fn capped(events: Vec<Event>, limits: EventLimits) -> Connection<Event> {
    let total = events.len();
    let mut sorted = events;
    sorted.sort_by_key(Event::timestamp);

    let mut nodes = Vec::new();
    let mut warnings = 0;
    for event in sorted {
        if nodes.len() >= limits.cap || warnings >= limits.target {
            break;
        }
        if event.is_warning() {
            warnings += 1;
        }
        nodes.push(event);
    }

    tracing::debug!(
        "Returning {} of {} events ({} warnings)",
        nodes.len(),
        total,
        warnings
    );
    Connection::with_total(nodes, total)
}
