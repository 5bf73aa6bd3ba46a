//! Ordering and capping of event feeds

use crossgraph::events::{self, EventLimits};
use crossgraph::models::{Event, FromObject, ObjectReference};
use serde_json::json;

fn event(name: &str, minute: u32, event_type: &str) -> Event {
    Event::from_object(
        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Event",
            "metadata": {"name": name, "namespace": "default"},
            "involvedObject": {
                "apiVersion": "example.org/v1alpha1",
                "kind": "XBucket",
                "name": "bucket",
                "uid": "uid-bucket"
            },
            "type": event_type,
            "lastTimestamp": format!("2024-05-01T10:{:02}:00Z", minute)
        }))
        .unwrap(),
    )
    .unwrap()
}

/// Listed out of order, so the feed has to sort them.
fn sample() -> Vec<Event> {
    vec![
        event("h", 6, "Warning"),
        event("a", 4, "Normal"),
        event("d", 0, "Normal"),
        event("g", 7, "Warning"),
        event("f", 3, "Warning"),
        event("e", 1, "Warning"),
        event("c", 5, "Normal"),
        event("b", 2, "Normal"),
    ]
}

fn names(events: &[Event]) -> Vec<&str> {
    events.iter().map(|e| e.metadata.name.as_str()).collect()
}

#[test]
fn test_stops_at_warning_target() {
    let feed = events::capped(sample(), EventLimits { target: 3, cap: 10 });
    assert_eq!(names(&feed.nodes), vec!["d", "e", "b", "f", "a", "c", "h"]);
    assert_eq!(feed.total_count, 8);
}

#[test]
fn test_cap_wins_before_target() {
    let feed = events::capped(sample(), EventLimits { target: 3, cap: 5 });
    assert_eq!(names(&feed.nodes), vec!["d", "e", "b", "f", "a"]);
}

#[test]
fn test_cap_below_target_fills_to_cap() {
    let feed = events::capped(sample(), EventLimits { target: 10, cap: 3 });
    assert_eq!(feed.nodes.len(), 3);
    assert_eq!(feed.nodes.iter().filter(|e| e.is_warning()).count(), 1);
}

#[test]
fn test_feed_is_ascending() {
    let feed = events::capped(sample(), EventLimits { target: 100, cap: 100 });
    let times: Vec<_> = feed.nodes.iter().map(Event::timestamp).collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);
    assert_eq!(feed.nodes.len(), 8);
}

#[test]
fn test_object_events_newest_first() {
    let target = ObjectReference::new("example.org/v1alpha1", "XBucket", "", "bucket");
    let feed = events::for_object(sample(), &target.with_uid("uid-bucket"));
    assert_eq!(names(&feed.nodes), vec!["g", "h", "c", "a", "f", "b", "e", "d"]);
}

#[test]
fn test_object_events_match_identity_without_uid() {
    let target = ObjectReference::new("example.org/v1alpha1", "XBucket", "", "bucket");
    assert_eq!(events::for_object(sample(), &target).nodes.len(), 8);

    let other = ObjectReference::new("example.org/v1alpha1", "XBucket", "", "other");
    assert!(events::for_object(sample(), &other).nodes.is_empty());

    let recreated = target.with_uid("uid-recreated");
    assert!(events::for_object(sample(), &recreated).nodes.is_empty());
}

/// Several events share a timestamp and are listed in a known order.
fn ties() -> Vec<Event> {
    vec![
        event("late-1", 5, "Normal"),
        event("tie-1", 2, "Warning"),
        event("tie-2", 2, "Normal"),
        event("early", 0, "Normal"),
        event("tie-3", 2, "Warning"),
        event("late-2", 5, "Warning"),
    ]
}

#[test]
fn test_feed_keeps_listed_order_for_equal_timestamps() {
    let feed = events::capped(ties(), EventLimits { target: 100, cap: 100 });
    assert_eq!(
        names(&feed.nodes),
        vec!["early", "tie-1", "tie-2", "tie-3", "late-1", "late-2"]
    );

    let feed = events::capped(ties(), EventLimits { target: 2, cap: 100 });
    assert_eq!(names(&feed.nodes), vec!["early", "tie-1", "tie-2", "tie-3"]);
}

#[test]
fn test_object_events_keep_listed_order_for_equal_timestamps() {
    let target = ObjectReference::new("example.org/v1alpha1", "XBucket", "", "bucket");
    let feed = events::for_object(ties(), &target.with_uid("uid-bucket"));
    assert_eq!(
        names(&feed.nodes),
        vec!["late-1", "late-2", "tie-1", "tie-2", "tie-3", "early"]
    );
}
