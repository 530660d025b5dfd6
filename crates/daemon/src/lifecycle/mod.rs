// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's own lifecycle state machine, PID-file guarding, and graceful shutdown.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::{Mutex, RwLock};
use strata_components::{ComponentBag, DefaultHealthManager};
use strata_contracts::HttpSurface;
use strata_core::{
    ComponentHealth, ComponentName, DaemonState, Event, EventPayload, JobHealth, JobName, RuntimeError,
};
use strata_jobs::JobManager;
use strata_supervisor::ComponentSupervisor;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::DaemonConfig;
use crate::pidfile::PidFile;

type ReloadCallback = Box<dyn Fn() -> Result<(), RuntimeError> + Send + Sync>;

/// Fields: config, current state (lock-guarded rather than a raw atomic since
/// transitions must be validated against [`DaemonState::can_transition_to`]), the
/// `HealthManager`, the HTTP surface handle, the pid file, and registered reload callbacks.
pub struct Daemon {
    config: RwLock<DaemonConfig>,
    state: RwLock<DaemonState>,
    health: Arc<DefaultHealthManager>,
    http: Arc<dyn HttpSurface>,
    pid_file: PidFile,
    bag: ComponentBag,
    supervisor: Arc<ComponentSupervisor>,
    job_manager: Option<Arc<JobManager>>,
    reload_callbacks: Mutex<Vec<ReloadCallback>>,
}

impl Daemon {
    /// `bag` must already contain a `health_manager`; there is no meaningful daemon without
    /// one to back `/readyz`.
    pub fn new(
        config: DaemonConfig,
        bag: ComponentBag,
        http: Arc<dyn HttpSurface>,
        supervisor: Arc<ComponentSupervisor>,
        job_manager: Option<Arc<JobManager>>,
    ) -> Result<Self, RuntimeError> {
        let health = bag.health_manager.clone().ok_or_else(|| {
            RuntimeError::BuildFatal {
                component: "health_manager".into(),
                source: Box::new(std::io::Error::other("health manager was not built")),
            }
        })?;
        let pid_file = PidFile::new(config.pid_path.clone());

        Ok(Self {
            config: RwLock::new(config),
            state: RwLock::new(DaemonState::Starting),
            health,
            http,
            pid_file,
            bag,
            supervisor,
            job_manager,
            reload_callbacks: Mutex::new(Vec::new()),
        })
    }

    pub fn state(&self) -> DaemonState {
        *self.state.read()
    }

    pub fn config(&self) -> DaemonConfig {
        self.config.read().clone()
    }

    pub fn health(&self) -> &Arc<DefaultHealthManager> {
        &self.health
    }

    pub fn register_reload_callback(
        &self,
        callback: impl Fn() -> Result<(), RuntimeError> + Send + Sync + 'static,
    ) {
        self.reload_callbacks.lock().push(Box::new(callback));
    }

    fn transition(&self, next: DaemonState) -> Result<(), RuntimeError> {
        let mut state = self.state.write();
        if !state.can_transition_to(next) {
            return Err(RuntimeError::ConcurrencyViolation(format!(
                "illegal daemon state transition {state} -> {next}"
            )));
        }
        *state = next;
        Ok(())
    }

    /// 1. claim the pid file (failure -> state=stopped, propagate). 2. state=running. 3. run
    /// the HTTP surface, waiting on either `shutdown` or a server error. 4. `stop()`. 5. the
    /// pid file is removed on every path past a successful claim.
    pub async fn start(&self, shutdown: CancellationToken) -> Result<(), RuntimeError> {
        if let Err(err) = self.pid_file.check_and_claim() {
            self.transition(DaemonState::Stopped)?;
            return Err(err);
        }

        let result = self.run(shutdown).await;
        if let Err(err) = self.pid_file.remove() {
            warn!(error = %err, "failed to remove pid file on shutdown");
        }
        result
    }

    async fn run(&self, shutdown: CancellationToken) -> Result<(), RuntimeError> {
        self.transition(DaemonState::Running)?;
        info!(bind_addr = %self.config.read().bind_addr, "daemon running");

        let server_shutdown = shutdown.clone();
        let serve_result = self.http.serve(server_shutdown);
        tokio::pin!(serve_result);

        tokio::select! {
            _ = shutdown.cancelled() => {}
            result = &mut serve_result => {
                if let Err(err) = result {
                    warn!(error = %err, "http surface exited with an error; shutting down");
                }
            }
        }

        self.stop().await;
        Ok(())
    }

    /// Idempotent. Cancels our own supervised components, stops periodic rebuilds, then shuts
    /// down external collaborators in the exact reverse of the build order: watcher -> cleaner
    /// -> queue -> graph -> bus -> registry. Only `graph` (connection) and `bus`/`queue`
    /// (`close`) expose a lifecycle hook within this workspace's scope; the others have no
    /// shutdown method to call and simply stop observing once their owning task is cancelled.
    /// Every collaborator gets its own deadline slice of `shutdown_timeout`; failures are
    /// logged, never aborting the rest of the sequence.
    pub async fn stop(&self) {
        {
            let mut state = self.state.write();
            if *state == DaemonState::Stopped {
                return;
            }
            if state.can_transition_to(DaemonState::Stopping) {
                *state = DaemonState::Stopping;
            }
        }

        self.supervisor.cancel_all();
        if let Some(job_manager) = &self.job_manager {
            job_manager.stop_periodic_rebuild();
        }

        let deadline = Instant::now() + self.config.read().shutdown_timeout;

        if let Some(graph) = self.bag.graph.clone() {
            self.with_deadline(deadline, "graph", graph.stop()).await;
        }
        if let Some(bus) = &self.bag.bus {
            bus.close();
        }

        let mut state = self.state.write();
        *state = DaemonState::Stopped;
    }

    async fn with_deadline<F>(&self, deadline: Instant, component: &str, fut: F)
    where
        F: Future<Output = Result<(), RuntimeError>>,
    {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match tokio::time::timeout(remaining, fut).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(component, error = %err, "collaborator shutdown failed"),
            Err(_) => warn!(component, "collaborator shutdown exceeded the deadline"),
        }
    }

    /// Re-reads the config file/environment first, publishing `config.reloaded` or
    /// `config.reload_failed`, then runs every registered callback in registration order; all
    /// callbacks run even if some fail. Errors are logged per-step and aggregated into a
    /// single `ConfigReload` error.
    pub fn trigger_config_reload(&self) -> Result<(), RuntimeError> {
        let mut errors = Vec::new();

        let reload_result = self.config.read().reload();
        match reload_result {
            Ok(reloaded) => {
                *self.config.write() = reloaded;
                self.publish_event(EventPayload::ConfigReloaded);
            }
            Err(err) => {
                warn!(error = %err, "failed to reload daemon config");
                self.publish_event(EventPayload::ConfigReloadFailed { error: err.clone() });
                errors.push(err);
            }
        }

        let callbacks = self.reload_callbacks.lock();
        for callback in callbacks.iter() {
            if let Err(err) = callback() {
                warn!(error = %err, "config reload callback failed");
                errors.push(err.to_string());
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(RuntimeError::ConfigReload(errors.join("; ")))
        }
    }

    /// Best-effort: logged and dropped if the bus was never built or has been closed.
    fn publish_event(&self, payload: EventPayload) {
        let Some(bus) = &self.bag.bus else { return };
        let event = Event::new(SystemTime::now(), payload);
        if let Err(err) = bus.publish(&CancellationToken::new(), event) {
            warn!(error = %err, "failed to publish config reload event");
        }
    }

    pub fn update_component_health(&self, updates: HashMap<ComponentName, ComponentHealth>) {
        self.health.update_components(updates);
    }

    pub fn update_job_health(&self, updates: HashMap<JobName, JobHealth>) {
        for (name, health) in updates {
            self.health.update_job(name, health);
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
