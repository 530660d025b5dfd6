// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use strata_contracts::HealthUpdater;
use strata_core::{ComponentHealth, ComponentName, RestartPolicy, RuntimeError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::supervised::Supervised;

pub const DEFAULT_MIN_BACKOFF: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// A table entry tags its `CancellationToken` with the generation this `spawn` call minted,
/// so a finished loop can tell whether it's still the entry's owner (natural exit: clean up)
/// or has already been replaced by a newer `spawn` (replace race: leave the newer entry alone).
struct Entry {
    generation: u64,
    cancel: CancellationToken,
}

/// One supervision loop per registered component, each cancelable independently. Backoff
/// doubling is entirely loop-local state: nothing here is shared across components or across
/// restarts of the same component beyond the one `Duration` each loop owns.
pub struct ComponentSupervisor {
    health: Arc<dyn HealthUpdater>,
    tasks: Arc<Mutex<HashMap<ComponentName, Entry>>>,
    next_generation: AtomicU64,
    min_backoff: Duration,
    max_backoff: Duration,
}

impl ComponentSupervisor {
    pub fn new(health: Arc<dyn HealthUpdater>) -> Self {
        Self {
            health,
            tasks: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
            min_backoff: DEFAULT_MIN_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }

    pub fn with_backoff_bounds(mut self, min: Duration, max: Duration) -> Self {
        self.min_backoff = min;
        self.max_backoff = max;
        self
    }

    /// Start supervising `component` under `name`. Replaces and cancels any prior loop
    /// registered under the same name.
    pub fn spawn(&self, name: ComponentName, restart_policy: RestartPolicy, component: Arc<dyn Supervised>) {
        let cancel = CancellationToken::new();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let previous = self.tasks.lock().insert(name.clone(), Entry { generation, cancel: cancel.clone() });
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }

        let health = self.health.clone();
        let tasks = self.tasks.clone();
        let min_backoff = self.min_backoff;
        let max_backoff = self.max_backoff;

        tokio::spawn(async move {
            run_loop(&name, restart_policy, component, &health, &cancel, min_backoff, max_backoff).await;
            // Remove the entry only if it's still this loop's own generation: a natural exit
            // (e.g. `RestartPolicy::Never` after a failed start) never cancels `cancel`, but
            // the table entry still needs cleaning up. Comparing the generation rather than
            // gating on `is_cancelled()` also means a concurrent `spawn` that already replaced
            // this entry with a newer loop is left untouched.
            let mut tasks = tasks.lock();
            if let Some(current) = tasks.get(&name) {
                if current.generation == generation {
                    tasks.remove(&name);
                }
            }
        });
    }

    /// Cancel a single supervision loop and remove its entry.
    pub fn cancel(&self, name: &ComponentName) {
        if let Some(entry) = self.tasks.lock().remove(name) {
            entry.cancel.cancel();
        }
    }

    /// Cancel every supervision loop and clear the table.
    pub fn cancel_all(&self) {
        let mut tasks = self.tasks.lock();
        for (_, entry) in tasks.drain() {
            entry.cancel.cancel();
        }
    }

    pub fn supervised_count(&self) -> usize {
        self.tasks.lock().len()
    }
}

async fn run_loop(
    name: &ComponentName,
    restart_policy: RestartPolicy,
    component: Arc<dyn Supervised>,
    health: &Arc<dyn HealthUpdater>,
    cancel: &CancellationToken,
    min_backoff: Duration,
    max_backoff: Duration,
) {
    let mut backoff = min_backoff;
    let mut last_success: Option<SystemTime> = None;

    loop {
        if cancel.is_cancelled() {
            return;
        }

        match component.start().await {
            Err(err) => {
                report(health, name, ComponentHealth::failed(SystemTime::now(), err.to_string())).await;
                warn!(component = %name, error = %err, "component failed to start");
                if restart_policy == RestartPolicy::Never {
                    return;
                }
            }
            Ok(()) => {
                let now = SystemTime::now();
                last_success = Some(now);
                let mut running = ComponentHealth::running(now);
                running.last_success = last_success;
                report(health, name, running).await;

                match component.fatal_channel() {
                    Some(mut fatal_rx) => {
                        tokio::select! {
                            _ = cancel.cancelled() => return,
                            maybe_err = fatal_rx.recv() => {
                                let err = maybe_err.unwrap_or(RuntimeError::ConcurrencyViolation(
                                    "fatal channel closed without a value".into(),
                                ));
                                let mut failed = ComponentHealth::failed(SystemTime::now(), err.to_string());
                                failed.last_success = last_success;
                                report(health, name, failed).await;
                                warn!(component = %name, error = %err, "component reported fatal error");
                            }
                        }
                    }
                    None => {
                        cancel.cancelled().await;
                        return;
                    }
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(backoff) => {}
        }
        debug!(component = %name, backoff_ms = backoff.as_millis(), "restarting after backoff");
        backoff = (backoff * 2).min(max_backoff);
    }
}

async fn report(health: &Arc<dyn HealthUpdater>, name: &ComponentName, value: ComponentHealth) {
    let mut updates = HashMap::with_capacity(1);
    updates.insert(name.clone(), value);
    health.update_component_health(updates).await;
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
