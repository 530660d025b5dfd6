// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stratad`: the runtime kernel's process entrypoint.
//!
//! Wires the bus, health manager, supervisor, and job manager together via
//! [`strata_components::ComponentBuilder`], claims the pid file, and serves `/healthz` and
//! `/readyz` until `SIGINT`/`SIGTERM` or the HTTP surface itself asks to stop. The walker,
//! watcher, graph client, and remembered-path registry are out of this workspace's scope
//! and are left unset in the bag here; a downstream binary that owns them would
//! register their `ComponentDefinition`s alongside the ones below before calling `build`.

use std::sync::Arc;

use strata_components::{
    BuildContext, BuiltValue, ComponentBag, ComponentBuilder, ComponentDefinition, ComponentRegistry,
};
use strata_core::{
    ComponentKind, ComponentName, Criticality, EventType, RestartPolicy, RuntimeError, SystemClock,
};
use strata_daemon::{AxumHttpSurface, Daemon, DaemonConfig};
use strata_eventbus::EventBus;
use strata_health::{HealthCollector, HealthManager};
use strata_jobs::JobManager;
use strata_supervisor::ComponentSupervisor;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const BUS_BUFFER_SIZE: usize = 100;

fn build_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();

    registry.register(ComponentDefinition::new(
        "bus",
        ComponentKind::Persistent,
        Criticality::Fatal,
        RestartPolicy::Never,
        |_ctx: &BuildContext| {
            Box::pin(async move {
                let critical_set = [EventType::PathDeleted, EventType::FileDiscovered].into_iter().collect();
                let bus = EventBus::new(BUS_BUFFER_SIZE, critical_set, None);
                Ok(Some(BuiltValue::Bus(bus)))
            })
        },
    ));

    registry.register(
        ComponentDefinition::new(
            "health_manager",
            ComponentKind::Persistent,
            Criticality::Fatal,
            RestartPolicy::Never,
            |_ctx: &BuildContext| {
                Box::pin(async move {
                    let manager = Arc::new(HealthManager::new(SystemClock));
                    Ok(Some(BuiltValue::HealthManager(manager)))
                })
            },
        )
        .with_dependencies(vec![ComponentName::new("bus")]),
    );

    registry
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        error!(error = %err, "stratad exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), RuntimeError> {
    let config = DaemonConfig::load();
    let cancellation = CancellationToken::new();

    let builder = ComponentBuilder::new(build_registry());
    let bag: ComponentBag = builder.build(cancellation.clone()).await?;

    // Both are `Fatal` criticality definitions above; `build` would have already returned
    // `BuildFatal` rather than reach here with either slot empty.
    let health = bag.health_manager.clone().ok_or_else(|| RuntimeError::BuildFatal {
        component: "health_manager".into(),
        source: Box::new(std::io::Error::other("bag slot unset after a fatal-criticality build")),
    })?;
    let bus = bag.bus.clone().ok_or_else(|| RuntimeError::BuildFatal {
        component: "bus".into(),
        source: Box::new(std::io::Error::other("bag slot unset after a fatal-criticality build")),
    })?;

    let supervisor = Arc::new(ComponentSupervisor::new(health.clone()));
    let collector = Arc::new(HealthCollector::new(SystemClock));
    let job_manager = Arc::new(JobManager::with_health_updater(
        Arc::clone(&bus),
        collector,
        None,
        None,
        None,
        Some(Arc::clone(&health) as Arc<dyn strata_contracts::HealthUpdater>),
    ));

    let http = Arc::new(AxumHttpSurface::new(config.bind_addr.clone(), health));
    let daemon = Arc::new(Daemon::new(config.clone(), bag, http, supervisor, Some(Arc::clone(&job_manager)))?);

    job_manager.initial_walk(&cancellation).await;
    job_manager.start_periodic_rebuild(config.rebuild_interval);

    let shutdown_signal = cancellation.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("shutdown signal received");
        shutdown_signal.cancel();
    });

    info!(bind_addr = %config.bind_addr, pid_path = %config.pid_path.display(), "starting stratad");
    daemon.start(cancellation).await
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let sigterm = signal(SignalKind::terminate());
    let sigint = signal(SignalKind::interrupt());
    let (mut sigterm, mut sigint) = match (sigterm, sigint) {
        (Ok(term), Ok(int)) => (term, int),
        (term, int) => {
            error!(
                sigterm_ok = term.is_ok(),
                sigint_ok = int.is_ok(),
                "failed to install a unix signal handler; falling back to ctrl_c only"
            );
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
