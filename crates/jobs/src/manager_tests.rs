// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use strata_contracts::{Cleaner, HealthUpdater, ReconcileOutcome, Registry, Walker, WalkerStats};
use strata_core::{ComponentHealth, ComponentName, EventType, JobHealth, SystemClock};
use strata_eventbus::EventBus;
use strata_health::HealthCollector;

use super::*;

#[derive(Default)]
struct RecordingHealthUpdater {
    job_updates: StdMutex<Vec<(JobName, JobHealth)>>,
}

#[async_trait]
impl HealthUpdater for RecordingHealthUpdater {
    async fn update_component_health(&self, _updates: std::collections::HashMap<ComponentName, ComponentHealth>) {}

    async fn update_job_health(&self, updates: std::collections::HashMap<JobName, JobHealth>) {
        let mut log = self.job_updates.lock().unwrap();
        for (name, health) in updates {
            log.push((name, health));
        }
    }
}

#[derive(Default)]
struct RecordingWalker {
    walk_all_calls: AtomicUsize,
    walk_calls: AtomicUsize,
    call_order: StdMutex<Vec<&'static str>>,
    fail: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl Walker for RecordingWalker {
    async fn walk(&self, _path: &Path) -> Result<(), RuntimeError> {
        self.walk_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn walk_all(&self) -> Result<(), RuntimeError> {
        self.call_order.lock().unwrap().push("walk_all");
        self.walk_all_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        if self.fail.load(Ordering::SeqCst) {
            return Err(RuntimeError::Graph("walk failed".into()));
        }
        Ok(())
    }

    async fn walk_all_incremental(&self) -> Result<(), RuntimeError> {
        self.walk_all().await
    }

    fn stats(&self) -> WalkerStats {
        WalkerStats { files_discovered: 3, dirs_traversed: 1, is_walking: false }
    }

    fn drain_discovered_paths(&self) -> HashSet<PathBuf> {
        HashSet::new()
    }
}

struct StubRegistry {
    roots: Vec<PathBuf>,
    removed: Vec<PathBuf>,
}

#[async_trait]
impl Registry for StubRegistry {
    async fn list_paths(&self) -> Result<Vec<PathBuf>, RuntimeError> {
        Ok(self.roots.clone())
    }
    async fn validate_and_clean_paths(&self) -> Result<Vec<PathBuf>, RuntimeError> {
        Ok(self.removed.clone())
    }
    async fn add_path(&self, _path: PathBuf) -> Result<(), RuntimeError> {
        Ok(())
    }
    async fn remove_path(&self, _path: &PathBuf) -> Result<(), RuntimeError> {
        Ok(())
    }
}

struct StubCleaner {
    stale: AtomicU64,
}

#[async_trait]
impl Cleaner for StubCleaner {
    async fn reconcile(
        &self,
        _root: &Path,
        _discovered: &HashSet<PathBuf>,
    ) -> Result<ReconcileOutcome, RuntimeError> {
        let count = self.stale.fetch_add(1, Ordering::SeqCst);
        Ok(ReconcileOutcome {
            stale_removed: vec![PathBuf::from(format!("/stale-{count}"))],
            duration: std::time::Duration::from_millis(1),
        })
    }

    async fn delete_path(&self, _path: &Path) -> Result<(), RuntimeError> {
        Ok(())
    }
}

fn bus() -> Arc<EventBus> {
    EventBus::new(100, HashSet::new(), None)
}

fn collector() -> Arc<HealthCollector<SystemClock>> {
    Arc::new(HealthCollector::new(SystemClock))
}

#[tokio::test]
async fn walker_not_initialized_returns_concurrency_violation() {
    let manager = JobManager::new(bus(), collector(), None, None, None);
    let cancel = CancellationToken::new();
    let err = manager.rebuild(&cancel, true).await.unwrap_err();
    assert!(matches!(err, RuntimeError::ConcurrencyViolation(_)));
}

#[tokio::test]
async fn nil_registry_yields_empty_removed_list_without_failing() {
    let walker = Arc::new(RecordingWalker::default());
    let manager = JobManager::new(bus(), collector(), Some(walker), None, None);
    let cancel = CancellationToken::new();
    let result = manager.rebuild(&cancel, true).await.unwrap();
    assert_eq!(result.status, JobStatus::Success);
    assert!(result.removed_paths.is_empty());
}

#[tokio::test]
async fn successful_rebuild_reconciles_every_remembered_root() {
    let walker = Arc::new(RecordingWalker::default());
    let registry = Arc::new(StubRegistry {
        roots: vec![PathBuf::from("/a"), PathBuf::from("/b")],
        removed: vec![PathBuf::from("/gone")],
    });
    let cleaner = Arc::new(StubCleaner { stale: AtomicU64::new(0) });
    let manager = JobManager::new(bus(), collector(), Some(walker), Some(registry), Some(cleaner));
    let cancel = CancellationToken::new();

    let result = manager.rebuild(&cancel, true).await.unwrap();
    assert_eq!(result.status, JobStatus::Success);
    assert_eq!(result.files_queued, 3);
    assert_eq!(result.dirs_processed, 1);
    // one pre-existing removed path from validate_and_clean, two stale ones from reconcile
    assert_eq!(result.removed_paths.len(), 3);
}

#[tokio::test]
async fn walk_failure_yields_failed_status_not_an_error() {
    let walker = Arc::new(RecordingWalker::default());
    walker.fail.store(true, Ordering::SeqCst);
    let manager = JobManager::new(bus(), collector(), Some(walker), None, None);
    let cancel = CancellationToken::new();
    let result = manager.rebuild(&cancel, true).await.unwrap();
    assert_eq!(result.status, JobStatus::Failed);
    assert!(!result.error.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn s6_concurrent_rebuilds_are_strictly_serialized() {
    let walker = Arc::new(RecordingWalker::default());
    let bus = bus();
    let manager = Arc::new(JobManager::new(bus.clone(), collector(), Some(walker.clone()), None, None));

    let started_order: Arc<StdMutex<Vec<EventType>>> = Arc::new(StdMutex::new(Vec::new()));
    let started_clone = Arc::clone(&started_order);
    let _sub = bus.subscribe(EventType::RebuildStarted, move |event| {
        started_clone.lock().unwrap().push(event.event_type());
    });

    let cancel = CancellationToken::new();
    let m1 = Arc::clone(&manager);
    let c1 = cancel.clone();
    let m2 = Arc::clone(&manager);
    let c2 = cancel.clone();

    let (r1, r2) = tokio::join!(
        tokio::spawn(async move { m1.rebuild(&c1, true).await }),
        tokio::spawn(async move { m2.rebuild(&c2, true).await }),
    );
    assert!(r1.unwrap().unwrap().status == JobStatus::Success);
    assert!(r2.unwrap().unwrap().status == JobStatus::Success);

    assert_eq!(walker.walk_all_calls.load(Ordering::SeqCst), 2);
    assert_eq!(walker.call_order.lock().unwrap().len(), 2);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(started_order.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn rebuild_with_record_reports_into_the_health_collector() {
    let walker = Arc::new(RecordingWalker::default());
    let collector = collector();
    let manager = JobManager::new(bus(), Arc::clone(&collector), Some(walker), None, None);
    let cancel = CancellationToken::new();

    let run = manager.rebuild_with_record(&cancel, true, JobName::new("job.initial_walk")).await;
    assert_eq!(run.status, JobStatus::Success);

    let stored = collector.get_job_result(&JobName::new("job.initial_walk"));
    assert_eq!(stored, Some(run));
}

#[tokio::test]
async fn rebuild_with_record_bridges_job_health_into_the_health_updater() {
    let walker = Arc::new(RecordingWalker::default());
    let health = Arc::new(RecordingHealthUpdater::default());
    let manager = JobManager::with_health_updater(
        bus(),
        collector(),
        Some(walker),
        None,
        None,
        Some(Arc::clone(&health) as Arc<dyn HealthUpdater>),
    );
    let cancel = CancellationToken::new();

    let run = manager.rebuild_with_record(&cancel, true, JobName::new("job.initial_walk")).await;
    assert_eq!(run.status, JobStatus::Success);

    let log = health.job_updates.lock().unwrap();
    assert_eq!(log.len(), 2);
    assert!(matches!(log[0], (_, JobHealth::Running { .. })));
    assert!(matches!(log[1], (_, JobHealth::Completed(_))));
    assert!(log.iter().all(|(name, _)| *name == JobName::new("job.initial_walk")));
}

#[tokio::test]
async fn initial_walk_uses_the_documented_job_name() {
    let walker = Arc::new(RecordingWalker::default());
    let collector = collector();
    let manager = JobManager::new(bus(), Arc::clone(&collector), Some(walker), None, None);
    let cancel = CancellationToken::new();

    manager.initial_walk(&cancel).await;
    assert!(collector.get_job_result(&JobName::new("job.initial_walk")).is_some());
}
