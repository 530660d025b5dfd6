// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health snapshot types shared by the supervisor, the health manager, and job runner.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a single supervised component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    Running,
    Degraded,
    Failed,
    Stopped,
}

crate::simple_display! {
    ComponentStatus {
        Running => "running",
        Degraded => "degraded",
        Failed => "failed",
        Stopped => "stopped",
    }
}

impl ComponentStatus {
    /// `running` is the only healthy status; every other value is unhealthy.
    pub fn is_healthy(self) -> bool {
        matches!(self, ComponentStatus::Running)
    }
}

/// Per-component snapshot tracked by the [`crate::HealthManager`](../strata_health equivalent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    /// Empty when `status` is `running`.
    pub error: String,
    pub last_checked: SystemTime,
    /// Timestamp the component entered its current status.
    pub since: SystemTime,
    pub last_success: Option<SystemTime>,
    pub details: HashMap<String, Value>,
}

impl ComponentHealth {
    pub fn running(now: SystemTime) -> Self {
        Self {
            status: ComponentStatus::Running,
            error: String::new(),
            last_checked: now,
            since: now,
            last_success: Some(now),
            details: HashMap::new(),
        }
    }

    pub fn failed(now: SystemTime, error: impl Into<String>) -> Self {
        Self {
            status: ComponentStatus::Failed,
            error: error.into(),
            last_checked: now,
            since: now,
            last_success: None,
            details: HashMap::new(),
        }
    }

    /// A component that is still running but impaired (e.g. the bus is dropping events past
    /// threshold, or the watcher reports degradation) rather than outright failed.
    pub fn degraded(now: SystemTime, error: impl Into<String>) -> Self {
        Self {
            status: ComponentStatus::Degraded,
            error: error.into(),
            last_checked: now,
            since: now,
            last_success: Some(now),
            details: HashMap::new(),
        }
    }
}

/// Status of a job invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Success,
    Partial,
    Failed,
}

crate::simple_display! {
    JobStatus {
        Running => "running",
        Success => "success",
        Partial => "partial",
        Failed => "failed",
    }
}

/// The value a job invocation returns; also what [`JobHealth`] mirrors once completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub status: JobStatus,
    pub started_at: SystemTime,
    pub finished_at: SystemTime,
    pub counts: HashMap<String, i64>,
    pub details: HashMap<String, Value>,
    /// Empty unless `status` is `failed` or `partial`.
    pub error: String,
}

impl RunResult {
    pub fn success(started_at: SystemTime, finished_at: SystemTime) -> Self {
        Self {
            status: JobStatus::Success,
            started_at,
            finished_at,
            counts: HashMap::new(),
            details: HashMap::new(),
            error: String::new(),
        }
    }

    pub fn failed(started_at: SystemTime, finished_at: SystemTime, error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            started_at,
            finished_at,
            counts: HashMap::new(),
            details: HashMap::new(),
            error: error.into(),
        }
    }
}

/// What [`crate::HealthManager`]'s job table exposes for a given job name: the latest
/// completed [`RunResult`], or a lightweight `running` marker while one is in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum JobHealth {
    Running { started_at: SystemTime },
    Completed(RunResult),
}

impl JobHealth {
    pub fn status(&self) -> JobStatus {
        match self {
            JobHealth::Running { .. } => JobStatus::Running,
            JobHealth::Completed(result) => result.status,
        }
    }

    /// Failed or partial job runs degrade the aggregate health.
    pub fn is_unhealthy(&self) -> bool {
        matches!(self.status(), JobStatus::Failed | JobStatus::Partial)
    }
}

/// Aggregate health exposed by the readiness endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub overall: Overall,
    pub ready: bool,
    pub uptime: Duration,
    pub components: HashMap<String, ComponentHealth>,
    pub jobs: HashMap<String, JobHealth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overall {
    Healthy,
    Degraded,
}

crate::simple_display! {
    Overall {
        Healthy => "healthy",
        Degraded => "degraded",
    }
}

impl HealthStatus {
    /// Compute `overall`/`ready` from a components and jobs snapshot:
    /// `healthy` iff every component is `running` and no job is `failed`/`partial`.
    pub fn compute(
        uptime: Duration,
        components: HashMap<String, ComponentHealth>,
        jobs: HashMap<String, JobHealth>,
    ) -> Self {
        let all_components_running = components.values().all(|c| c.status.is_healthy());
        let no_bad_jobs = jobs.values().all(|j| !j.is_unhealthy());
        let overall = if all_components_running && no_bad_jobs {
            Overall::Healthy
        } else {
            Overall::Degraded
        };
        Self { overall, ready: true, uptime, components, jobs }
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
