// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translates a built component's point-in-time stats into a [`strata_core::ComponentHealth`]
//! or [`strata_core::JobHealth`] write.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use strata_contracts::WatcherStats;
use strata_core::{Clock, ComponentHealth, JobHealth, JobName, RunResult, SystemClock};
use strata_eventbus::BusStats;

/// Bus degradation becomes true once the drop rate exceeds this.
pub const BUS_DEGRADE_DROP_RATE: f64 = 0.05;
/// Bus degradation clears only once the drop rate falls below this (hysteresis).
pub const BUS_RECOVER_DROP_RATE: f64 = 0.01;
/// Critical-queue backlog ratio considered "high".
pub const QUEUE_HIGH_BACKLOG_RATIO: f64 = 0.8;

struct JobState {
    running: HashMap<JobName, SystemTime>,
    results: HashMap<JobName, RunResult>,
}

/// Thin adapter: given a collaborator's stats, produce the health write. Keeps bus
/// degradation hysteretic across calls (a single `RwLock<bool>` carries the previous
/// decision), and owns the job-running/job-results tables mirrored into
/// [`crate::HealthManager`] by the caller.
pub struct HealthCollector<C: Clock = SystemClock> {
    clock: C,
    bus_degraded: RwLock<bool>,
    jobs: RwLock<JobState>,
}

impl<C: Clock> HealthCollector<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            bus_degraded: RwLock::new(false),
            jobs: RwLock::new(JobState { running: HashMap::new(), results: HashMap::new() }),
        }
    }

    fn now_system(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.clock.epoch_ms())
    }

    pub fn record_job_start(&self, name: JobName) {
        self.jobs.write().running.insert(name, self.now_system());
    }

    pub fn record_job_result(&self, name: JobName, result: RunResult) {
        let mut jobs = self.jobs.write();
        jobs.running.remove(&name);
        jobs.results.insert(name, result);
    }

    pub fn get_job_result(&self, name: &JobName) -> Option<RunResult> {
        self.jobs.read().results.get(name).cloned()
    }

    /// Snapshot suitable for writing straight into [`crate::HealthManager::update_job`] per
    /// entry: a job currently running reports `Running`, otherwise its last `RunResult`.
    pub fn job_health_snapshot(&self) -> HashMap<JobName, JobHealth> {
        let jobs = self.jobs.read();
        let mut snapshot: HashMap<JobName, JobHealth> = jobs
            .results
            .iter()
            .map(|(name, result)| (name.clone(), JobHealth::Completed(result.clone())))
            .collect();
        for (name, started_at) in &jobs.running {
            snapshot.insert(name.clone(), JobHealth::Running { started_at: *started_at });
        }
        snapshot
    }

    /// Bus health is degraded when the drop rate crosses `BUS_DEGRADE_DROP_RATE` or the
    /// critical-queue backlog is "high"; it recovers only once the drop rate falls below
    /// `BUS_RECOVER_DROP_RATE` AND the backlog is no longer high.
    pub fn collect_bus_health(&self, stats: BusStats) -> ComponentHealth {
        let backlog_high = stats.critical_queue_cap > 0
            && (stats.critical_queue_len as f64 / stats.critical_queue_cap as f64)
                >= QUEUE_HIGH_BACKLOG_RATIO;

        let mut degraded = self.bus_degraded.write();
        if !*degraded {
            if stats.drop_rate > BUS_DEGRADE_DROP_RATE || backlog_high {
                *degraded = true;
            }
        } else if stats.drop_rate < BUS_RECOVER_DROP_RATE && !backlog_high {
            *degraded = false;
        }

        let now = self.now_system();
        if *degraded {
            ComponentHealth::degraded(
                now,
                format!(
                    "bus degraded: drop_rate={:.4} critical_queue={}/{}",
                    stats.drop_rate, stats.critical_queue_len, stats.critical_queue_cap
                ),
            )
        } else {
            ComponentHealth::running(now)
        }
    }

    pub fn collect_watcher_health(&self, stats: WatcherStats) -> ComponentHealth {
        let now = self.now_system();
        if stats.degraded {
            ComponentHealth::degraded(now, "watcher degraded")
        } else {
            ComponentHealth::running(now)
        }
    }
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
