// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashSet;
use std::time::Duration;

fn now() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(42)
}

#[test]
fn event_type_matches_payload_constructor() {
    let event = Event::new(now(), EventPayload::PathDeleted { path: "/a".into() });
    assert_eq!(event.event_type(), EventType::PathDeleted);
}

#[test]
fn default_critical_set_is_path_deleted_and_file_discovered() {
    assert!(EventType::PathDeleted.is_critical_by_default());
    assert!(EventType::FileDiscovered.is_critical_by_default());
    assert!(!EventType::FileChanged.is_critical_by_default());
    assert!(!EventType::JobStarted.is_critical_by_default());
}

#[test]
fn is_critical_checks_membership_in_the_supplied_set() {
    let mut set = HashSet::new();
    set.insert(EventType::WatcherDegraded);
    let event = Event::new(now(), EventPayload::WatcherDegraded { reason: "lag".into() });
    assert!(event.is_critical(&set));

    let other = Event::new(now(), EventPayload::WatcherRecovered);
    assert!(!other.is_critical(&set));
}

#[test]
fn event_classes_partition_as_specified() {
    assert_eq!(EventType::FileDiscovered.class(), EventClass::FilePath);
    assert_eq!(EventType::RememberedPathAdded.class(), EventClass::FilePath);
    assert_eq!(EventType::AnalysisComplete.class(), EventClass::AnalysisGraph);
    assert_eq!(EventType::GraphFatal.class(), EventClass::AnalysisGraph);
    assert_eq!(EventType::JobStarted.class(), EventClass::LifecycleJob);
    assert_eq!(EventType::RebuildComplete.class(), EventClass::LifecycleJob);
}

#[test]
fn event_type_display_matches_wire_name() {
    assert_eq!(EventType::PathDeleted.to_string(), "path.deleted");
    assert_eq!(EventType::JobCompleted.to_string(), "job.completed");
}

#[test]
fn payload_round_trips_through_json() {
    let event = Event::new(
        now(),
        EventPayload::RebuildComplete {
            files_queued: 10,
            dirs_processed: 3,
            duration_ms: 250,
            removed_paths: vec!["/gone".into()],
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    let decoded: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, event);
}
