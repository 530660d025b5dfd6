// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The generic job-lifecycle wrapper: records start/finish timestamps and emits
//! `job.started` / `job.completed` / `job.failed` around a caller-provided function.

use std::future::Future;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use strata_core::{Event, EventPayload, JobName, JobStatus, RunResult};
use strata_eventbus::EventBus;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Wraps a job function with the `job.started`/`job.completed`/`job.failed` event triple.
/// Does not itself record anything into the health manager — the caller does, which keeps
/// `f` testable in isolation from health bookkeeping.
pub struct JobRunner {
    bus: Arc<EventBus>,
}

impl JobRunner {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// Runs `f`, filling in any timestamp it left unset (`UNIX_EPOCH` sentinel), and
    /// publishes the lifecycle events around it. `job.started` strictly precedes
    /// `job.completed`; `job.failed` is additionally published when the result is `failed`.
    pub async fn run<F, Fut>(&self, cancel: &CancellationToken, name: JobName, f: F) -> RunResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RunResult>,
    {
        let started_at = SystemTime::now();
        self.publish(
            cancel,
            EventPayload::JobStarted { name: name.to_string(), started_at },
        );

        let mut result = f().await;
        if result.started_at == UNIX_EPOCH {
            result.started_at = started_at;
        }
        if result.finished_at == UNIX_EPOCH {
            result.finished_at = SystemTime::now();
        }

        self.publish(
            cancel,
            EventPayload::JobCompleted { name: name.to_string(), result: result.clone() },
        );
        if result.status == JobStatus::Failed {
            self.publish(
                cancel,
                EventPayload::JobFailed { name: name.to_string(), error: result.error.clone() },
            );
        }

        result
    }

    fn publish(&self, cancel: &CancellationToken, payload: EventPayload) {
        let event = Event::new(SystemTime::now(), payload);
        if let Err(err) = self.bus.publish(cancel, event) {
            warn!(error = %err, "failed to publish job lifecycle event");
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
