// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::SystemTime;

use super::*;
use strata_core::EventType;
use strata_eventbus::EventBus;

fn bus() -> Arc<EventBus> {
    EventBus::new(100, HashSet::new(), None)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn started_strictly_precedes_completed() {
    let bus = bus();
    let order: Arc<StdMutex<Vec<EventType>>> = Arc::new(StdMutex::new(Vec::new()));
    let order_clone = Arc::clone(&order);
    let _sub = bus.subscribe_all(move |event| {
        order_clone.lock().unwrap().push(event.event_type());
    });

    let cancel = CancellationToken::new();
    let runner = JobRunner::new(Arc::clone(&bus));
    let result = runner
        .run(&cancel, JobName::new("job.test"), || async {
            let now = SystemTime::now();
            RunResult::success(now, now)
        })
        .await;
    assert_eq!(result.status, JobStatus::Success);

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let order = order.lock().unwrap();
    let started_idx = order.iter().position(|t| *t == EventType::JobStarted).unwrap();
    let completed_idx = order.iter().position(|t| *t == EventType::JobCompleted).unwrap();
    assert!(started_idx < completed_idx);
    assert!(!order.iter().any(|t| *t == EventType::JobFailed));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_result_additionally_emits_job_failed() {
    let bus = bus();
    let failed_count = Arc::new(AtomicUsize::new(0));
    let failed_clone = Arc::clone(&failed_count);
    let _sub = bus.subscribe(EventType::JobFailed, move |_event| {
        failed_clone.fetch_add(1, Ordering::SeqCst);
    });

    let cancel = CancellationToken::new();
    let runner = JobRunner::new(Arc::clone(&bus));
    let result = runner
        .run(&cancel, JobName::new("job.test"), || async {
            let now = SystemTime::now();
            RunResult::failed(now, now, "boom")
        })
        .await;
    assert_eq!(result.status, JobStatus::Failed);

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(failed_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fills_in_timestamps_the_job_function_left_unset() {
    let bus = bus();
    let cancel = CancellationToken::new();
    let runner = JobRunner::new(bus);
    let result = runner
        .run(&cancel, JobName::new("job.test"), || async {
            RunResult::success(std::time::UNIX_EPOCH, std::time::UNIX_EPOCH)
        })
        .await;
    assert_ne!(result.started_at, std::time::UNIX_EPOCH);
    assert_ne!(result.finished_at, std::time::UNIX_EPOCH);
}
