// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Higher-level rebuild/walk operations built on [`crate::JobRunner`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use parking_lot::Mutex;
use strata_contracts::{Cleaner, HealthUpdater, Registry, Walker};
use strata_core::{Event, EventPayload, JobHealth, JobName, JobStatus, RunResult, RuntimeError};
use strata_eventbus::EventBus;
use strata_health::HealthCollector;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::runner::JobRunner;

/// Outcome of one rebuild cycle: validate-and-clean -> walk -> reconcile.
#[derive(Debug, Clone, PartialEq)]
pub struct RebuildResult {
    pub status: JobStatus,
    pub files_queued: u64,
    pub dirs_processed: u64,
    pub duration: Duration,
    pub removed_paths: Vec<PathBuf>,
    pub error: String,
}

/// Serializes rebuild/walk jobs behind a single mutex so at most one runs at a time: the
/// periodic-rebuild task acquires the same mutex as an on-demand rebuild, guaranteeing no
/// two walks overlap.
pub struct JobManager {
    bus: Arc<EventBus>,
    runner: JobRunner,
    walker: Option<Arc<dyn Walker>>,
    registry: Option<Arc<dyn Registry>>,
    cleaner: Option<Arc<dyn Cleaner>>,
    collector: Arc<HealthCollector>,
    health: Option<Arc<dyn HealthUpdater>>,
    rebuild_lock: Arc<AsyncMutex<()>>,
    periodic: Mutex<Option<CancellationToken>>,
}

impl JobManager {
    pub fn new(
        bus: Arc<EventBus>,
        collector: Arc<HealthCollector>,
        walker: Option<Arc<dyn Walker>>,
        registry: Option<Arc<dyn Registry>>,
        cleaner: Option<Arc<dyn Cleaner>>,
    ) -> Self {
        Self::with_health_updater(bus, collector, walker, registry, cleaner, None)
    }

    /// Like [`Self::new`], but also pushes every recorded job result into `health`: the
    /// `HealthCollector` owns the job tables, but `HealthManager` is what `/readyz` reads, so
    /// the caller that records a result is the one that bridges the two.
    pub fn with_health_updater(
        bus: Arc<EventBus>,
        collector: Arc<HealthCollector>,
        walker: Option<Arc<dyn Walker>>,
        registry: Option<Arc<dyn Registry>>,
        cleaner: Option<Arc<dyn Cleaner>>,
        health: Option<Arc<dyn HealthUpdater>>,
    ) -> Self {
        Self {
            runner: JobRunner::new(Arc::clone(&bus)),
            bus,
            walker,
            registry,
            cleaner,
            collector,
            health,
            rebuild_lock: Arc::new(AsyncMutex::new(())),
            periodic: Mutex::new(None),
        }
    }

    /// Validate-and-clean -> walk -> reconcile for every remembered root. SERIALIZED: a
    /// concurrent caller blocks until the in-flight rebuild completes.
    pub async fn rebuild(&self, cancel: &CancellationToken, full: bool) -> Result<RebuildResult, RuntimeError> {
        let _permit = self.rebuild_lock.lock().await;
        let start = Instant::now();

        self.publish(cancel, EventPayload::RebuildStarted { full });

        let Some(walker) = self.walker.as_ref() else {
            let err = RuntimeError::ConcurrencyViolation("walker not initialized".into());
            let result = RebuildResult {
                status: JobStatus::Failed,
                files_queued: 0,
                dirs_processed: 0,
                duration: start.elapsed(),
                removed_paths: Vec::new(),
                error: err.to_string(),
            };
            self.publish_complete(cancel, &result);
            return Err(err);
        };

        let mut removed_paths = match &self.registry {
            Some(registry) => registry.validate_and_clean_paths().await.unwrap_or_else(|err| {
                warn!(error = %err, "validate_and_clean_paths failed; continuing with an empty removed list");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let walk_result =
            if full { walker.walk_all().await } else { walker.walk_all_incremental().await };

        if let Err(err) = walk_result {
            let result = RebuildResult {
                status: JobStatus::Failed,
                files_queued: 0,
                dirs_processed: 0,
                duration: start.elapsed(),
                removed_paths,
                error: err.to_string(),
            };
            self.publish_complete(cancel, &result);
            return Ok(result);
        }

        if cancel.is_cancelled() {
            let result = RebuildResult {
                status: JobStatus::Failed,
                files_queued: 0,
                dirs_processed: 0,
                duration: start.elapsed(),
                removed_paths,
                error: "rebuild cancelled before reconciliation".into(),
            };
            self.publish_complete(cancel, &result);
            return Ok(result);
        }

        let stats = walker.stats();
        let discovered = walker.drain_discovered_paths();

        if let (Some(cleaner), Some(registry)) = (&self.cleaner, &self.registry) {
            match registry.list_paths().await {
                Ok(roots) => {
                    for root in roots {
                        match cleaner.reconcile(&root, &discovered).await {
                            Ok(outcome) => removed_paths.extend(outcome.stale_removed),
                            Err(err) => warn!(
                                root = %root.display(), error = %err,
                                "reconciliation failed for root; rebuild continues"
                            ),
                        }
                    }
                }
                Err(err) => warn!(error = %err, "failed to list remembered paths for reconciliation"),
            }
        }

        let result = RebuildResult {
            status: JobStatus::Success,
            files_queued: stats.files_discovered,
            dirs_processed: stats.dirs_traversed,
            duration: start.elapsed(),
            removed_paths,
            error: String::new(),
        };
        self.publish_complete(cancel, &result);
        Ok(result)
    }

    /// Wraps [`Self::rebuild`] with [`JobRunner::run`] and records the resulting
    /// [`RunResult`] on the [`HealthCollector`].
    pub async fn rebuild_with_record(
        &self,
        cancel: &CancellationToken,
        full: bool,
        job_name: impl Into<JobName>,
    ) -> RunResult {
        let job_name = job_name.into();
        self.collector.record_job_start(job_name.clone());
        if let Some(health) = &self.health {
            let started_at = SystemTime::now();
            let mut updates = std::collections::HashMap::with_capacity(1);
            updates.insert(job_name.clone(), JobHealth::Running { started_at });
            health.update_job_health(updates).await;
        }

        let result = self
            .runner
            .run(cancel, job_name.clone(), || async {
                let started_at = SystemTime::now();
                let outcome = self.rebuild(cancel, full).await;
                let finished_at = SystemTime::now();
                match outcome {
                    Ok(rebuild) if rebuild.status == JobStatus::Success => {
                        let mut run = RunResult::success(started_at, finished_at);
                        run.counts.insert("files_queued".into(), rebuild.files_queued as i64);
                        run.counts
                            .insert("dirs_processed".into(), rebuild.dirs_processed as i64);
                        run.counts
                            .insert("removed_paths".into(), rebuild.removed_paths.len() as i64);
                        run
                    }
                    Ok(rebuild) => RunResult::failed(started_at, finished_at, rebuild.error),
                    Err(err) => RunResult::failed(started_at, finished_at, err.to_string()),
                }
            })
            .await;

        self.collector.record_job_result(job_name.clone(), result.clone());
        if let Some(health) = &self.health {
            let mut updates = std::collections::HashMap::with_capacity(1);
            updates.insert(job_name, JobHealth::Completed(result.clone()));
            health.update_job_health(updates).await;
        }
        result
    }

    /// Called once at startup: `RebuildWithRecord(full=true, "job.initial_walk")`.
    pub async fn initial_walk(&self, cancel: &CancellationToken) -> RunResult {
        self.rebuild_with_record(cancel, true, JobName::new("job.initial_walk")).await
    }

    /// Launches a ticker-driven task calling `RebuildWithRecord(full=false,
    /// "job.rebuild_incremental")` on every tick. Replaces (cancelling) any prior periodic
    /// task if already running.
    pub fn start_periodic_rebuild(self: &Arc<Self>, interval: Duration) {
        let cancel = CancellationToken::new();
        let previous = self.periodic.lock().replace(cancel.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it since an initial walk already ran
            // at startup and firing a second rebuild right away would be redundant.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = ticker.tick() => {
                        manager
                            .rebuild_with_record(&cancel, false, JobName::new("job.rebuild_incremental"))
                            .await;
                    }
                }
            }
        });
    }

    /// Idempotent: cancels the periodic task if one is running.
    pub fn stop_periodic_rebuild(&self) {
        if let Some(token) = self.periodic.lock().take() {
            token.cancel();
        }
    }

    /// Holds the rebuild mutex and walks a single root; used for event-driven single-root
    /// refresh.
    pub async fn walk_path(&self, cancel: &CancellationToken, path: &Path) -> Result<(), RuntimeError> {
        let _permit = self.rebuild_lock.lock().await;
        let Some(walker) = self.walker.as_ref() else {
            return Err(RuntimeError::ConcurrencyViolation("walker not initialized".into()));
        };
        if cancel.is_cancelled() {
            return Err(RuntimeError::ConcurrencyViolation("walk_path cancelled".into()));
        }
        walker.walk(path).await
    }

    fn publish(&self, cancel: &CancellationToken, payload: EventPayload) {
        let event = Event::new(SystemTime::now(), payload);
        if let Err(err) = self.bus.publish(cancel, event) {
            warn!(error = %err, "failed to publish rebuild event");
        }
    }

    fn publish_complete(&self, cancel: &CancellationToken, result: &RebuildResult) {
        self.publish(
            cancel,
            EventPayload::RebuildComplete {
                files_queued: result.files_queued,
                dirs_processed: result.dirs_processed,
                duration_ms: result.duration.as_millis() as u64,
                removed_paths: result.removed_paths.clone(),
            },
        );
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
