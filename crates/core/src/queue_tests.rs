// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn entry_round_trips_through_json() {
    let entry = CriticalQueueEntry {
        id: 7,
        payload: EventPayload::FileDiscovered { path: "/a/b".into() },
        created_at: SystemTime::UNIX_EPOCH + Duration::from_secs(100),
    };
    let json = serde_json::to_string(&entry).unwrap();
    let decoded: CriticalQueueEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, entry);
}
