// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use async_trait::async_trait;
use strata_core::{ComponentHealth, ComponentName, JobHealth, JobName};

/// Implemented by the daemon; used by the supervisor, the job manager, and the health
/// collector to push transactional per-component/per-job health writes without depending on
/// the daemon crate directly.
#[async_trait]
pub trait HealthUpdater: Send + Sync + 'static {
    async fn update_component_health(&self, updates: HashMap<ComponentName, ComponentHealth>);

    async fn update_job_health(&self, updates: HashMap<JobName, JobHealth>);
}
