// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn now() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

#[test]
fn healthy_iff_all_components_running_and_no_bad_jobs() {
    let mut components = HashMap::new();
    components.insert("c1".to_string(), ComponentHealth::running(now()));
    let mut jobs = HashMap::new();
    jobs.insert(
        "j1".to_string(),
        JobHealth::Completed(RunResult::success(now(), now())),
    );

    let status = HealthStatus::compute(Duration::from_secs(10), components, jobs);
    assert_eq!(status.overall, Overall::Healthy);
    assert!(status.ready);
}

#[test]
fn degraded_when_a_component_is_not_running() {
    let mut components = HashMap::new();
    components.insert("c1".to_string(), ComponentHealth::failed(now(), "boom"));
    let status = HealthStatus::compute(Duration::from_secs(0), components, HashMap::new());
    assert_eq!(status.overall, Overall::Degraded);
    assert!(status.ready, "degraded daemon must still be ready");
}

#[test]
fn degraded_when_a_job_failed() {
    let mut components = HashMap::new();
    components.insert("c1".to_string(), ComponentHealth::running(now()));
    let mut jobs = HashMap::new();
    jobs.insert(
        "j1".to_string(),
        JobHealth::Completed(RunResult::failed(now(), now(), "walk error")),
    );
    let status = HealthStatus::compute(Duration::from_secs(0), components, jobs);
    assert_eq!(status.overall, Overall::Degraded);
}

#[test]
fn s5_scenario_from_spec() {
    // S5: one component running, one job failed -> degraded, ready, fields preserved.
    let mut components = HashMap::new();
    components.insert("c1".to_string(), ComponentHealth::running(now()));
    let mut jobs = HashMap::new();
    jobs.insert(
        "j1".to_string(),
        JobHealth::Completed(RunResult::failed(now(), now(), "err")),
    );
    let status = HealthStatus::compute(Duration::from_secs(5), components, jobs);
    assert_eq!(status.overall, Overall::Degraded);
    assert!(status.ready);
    assert_eq!(status.components["c1"].status, ComponentStatus::Running);
    assert_eq!(status.jobs["j1"].status(), JobStatus::Failed);
}

#[test]
fn job_health_running_marker_is_not_unhealthy() {
    let health = JobHealth::Running { started_at: now() };
    assert_eq!(health.status(), JobStatus::Running);
    assert!(!health.is_unhealthy());
}

#[test]
fn partial_job_status_is_unhealthy() {
    let mut result = RunResult::failed(now(), now(), "partial");
    result.status = JobStatus::Partial;
    let health = JobHealth::Completed(result);
    assert!(health.is_unhealthy());
}
