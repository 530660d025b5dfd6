// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::RwLock;
use strata_contracts::HealthUpdater;
use strata_core::{Clock, ComponentHealth, ComponentName, HealthStatus, JobHealth, JobName, SystemClock};

/// Single reader-writer lock over component and job health, plus a start timestamp for
/// uptime. `status()` returns a deep copy: mutating the returned maps never affects a later
/// `status()` call, since the clone happens once under the read lock.
pub struct HealthManager<C: Clock = SystemClock> {
    clock: C,
    start: Instant,
    components: RwLock<HashMap<ComponentName, ComponentHealth>>,
    jobs: RwLock<HashMap<JobName, JobHealth>>,
}

impl<C: Clock> HealthManager<C> {
    pub fn new(clock: C) -> Self {
        let start = clock.now();
        Self { clock, start, components: RwLock::new(HashMap::new()), jobs: RwLock::new(HashMap::new()) }
    }

    pub fn update_component(&self, name: ComponentName, health: ComponentHealth) {
        self.components.write().insert(name, health);
    }

    pub fn update_components(&self, updates: HashMap<ComponentName, ComponentHealth>) {
        let mut components = self.components.write();
        for (name, health) in updates {
            components.insert(name, health);
        }
    }

    pub fn remove_component(&self, name: &ComponentName) {
        self.components.write().remove(name);
    }

    pub fn update_job(&self, name: JobName, health: JobHealth) {
        self.jobs.write().insert(name, health);
    }

    pub fn remove_job(&self, name: &JobName) {
        self.jobs.write().remove(name);
    }

    /// Computes the aggregate on every call; cheap, O(components + jobs).
    pub fn status(&self) -> HealthStatus {
        let components: HashMap<String, ComponentHealth> = self
            .components
            .read()
            .iter()
            .map(|(name, health)| (name.to_string(), health.clone()))
            .collect();
        let jobs: HashMap<String, JobHealth> = self
            .jobs
            .read()
            .iter()
            .map(|(name, health)| (name.to_string(), health.clone()))
            .collect();
        let uptime = self.clock.now().saturating_duration_since(self.start);
        HealthStatus::compute(uptime, components, jobs)
    }
}

impl<C: Clock> std::fmt::Debug for HealthManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthManager")
            .field("components", &self.components.read().len())
            .field("jobs", &self.jobs.read().len())
            .finish()
    }
}

#[async_trait]
impl<C: Clock> HealthUpdater for HealthManager<C> {
    async fn update_component_health(&self, updates: HashMap<ComponentName, ComponentHealth>) {
        self.update_components(updates);
    }

    async fn update_job_health(&self, updates: HashMap<JobName, JobHealth>) {
        for (name, health) in updates {
            self.update_job(name, health);
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
