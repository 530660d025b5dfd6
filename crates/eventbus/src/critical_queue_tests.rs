// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

fn path_payload(path: &str) -> EventPayload {
    EventPayload::FileDiscovered { path: path.into() }
}

#[test]
fn drop_oldest_keeps_last_cap_entries_in_insertion_order() {
    let dir = tempdir().unwrap();
    let queue = CriticalQueue::open(dir.path().join("critical.log"), 3).unwrap();

    for i in 0..4 {
        queue.enqueue(path_payload(&format!("/{i}"))).unwrap();
    }

    assert_eq!(queue.len(), 3);
    let remaining: Vec<_> = (0..3)
        .map(|_| futures_block_on_dequeue(&queue))
        .collect();
    let paths: Vec<String> = remaining
        .into_iter()
        .map(|e| match e.unwrap().payload {
            EventPayload::FileDiscovered { path } => path.display().to_string(),
            _ => panic!("unexpected payload"),
        })
        .collect();
    assert_eq!(paths, vec!["/1", "/2", "/3"]);
}

#[test]
fn reopen_replays_the_same_bounded_window() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("critical.log");

    {
        let queue = CriticalQueue::open(&log_path, 2).unwrap();
        queue.enqueue(path_payload("/a")).unwrap();
        queue.enqueue(path_payload("/b")).unwrap();
        queue.enqueue(path_payload("/c")).unwrap();
    }

    let reopened = CriticalQueue::open(&log_path, 2).unwrap();
    assert_eq!(reopened.len(), 2);
    let first = futures_block_on_dequeue(&reopened).unwrap().unwrap();
    match first.payload {
        EventPayload::FileDiscovered { path } => assert_eq!(path.display().to_string(), "/b"),
        _ => panic!("unexpected payload"),
    }
}

#[test]
fn reopen_after_partial_dequeue_does_not_resurrect_delivered_entries() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("critical.log");

    {
        let queue = CriticalQueue::open(&log_path, 5).unwrap();
        queue.enqueue(path_payload("/a")).unwrap();
        queue.enqueue(path_payload("/b")).unwrap();
        let _ = futures_block_on_dequeue(&queue);
    }

    let reopened = CriticalQueue::open(&log_path, 5).unwrap();
    assert_eq!(reopened.len(), 1);
}

#[tokio::test]
async fn dequeue_observes_cancellation_when_empty() {
    let dir = tempdir().unwrap();
    let queue = CriticalQueue::open(dir.path().join("critical.log"), 2).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = queue.dequeue(&cancel).await.unwrap();
    assert!(result.is_none());
}

/// Drives a single `dequeue` call to completion on a throwaway current-thread runtime, since
/// most of this module's tests are deliberately synchronous (they exercise file replay, not
/// concurrency).
fn futures_block_on_dequeue(
    queue: &CriticalQueue,
) -> Result<Option<strata_core::CriticalQueueEntry>, RuntimeError> {
    let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
    rt.block_on(async {
        let cancel = CancellationToken::new();
        queue.dequeue(&cancel).await
    })
}
