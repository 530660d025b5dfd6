// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference `axum` implementation of the `/healthz`/`/readyz` surface the core registers but
//! does not itself implement.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json as AxumJson;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use strata_contracts::HttpSurface;
use strata_core::{Clock, HealthStatus, RuntimeError, SystemClock};
use strata_health::HealthManager;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct LivenessResponse {
    status: &'static str,
    timestamp: u64,
}

#[derive(Debug, Serialize)]
struct ReadinessResponse {
    #[serde(flatten)]
    health: HealthStatus,
    timestamp: u64,
}

/// Binds `bind_addr` and serves exactly two routes: `/healthz` (always
/// 200, liveness only) and `/readyz` (200 with the aggregate `HealthStatus`, even when
/// degraded — readiness here reports state, it does not gate traffic).
pub struct AxumHttpSurface<C: Clock = SystemClock> {
    bind_addr: String,
    health: Arc<HealthManager<C>>,
}

impl<C: Clock> AxumHttpSurface<C> {
    pub fn new(bind_addr: impl Into<String>, health: Arc<HealthManager<C>>) -> Self {
        Self { bind_addr: bind_addr.into(), health }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/healthz", get(healthz))
            .route("/readyz", get(readyz::<C>))
            .with_state(Arc::clone(&self.health))
    }
}

#[async_trait]
impl<C: Clock> HttpSurface for AxumHttpSurface<C> {
    async fn serve(&self, shutdown: CancellationToken) -> Result<(), RuntimeError> {
        let listener = tokio::net::TcpListener::bind(&self.bind_addr).await?;
        info!(bind_addr = %self.bind_addr, "http surface listening");

        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|err| {
                warn!(error = %err, "http surface exited with an error");
                RuntimeError::Io(err)
            })
    }
}

async fn healthz() -> AxumJson<LivenessResponse> {
    AxumJson(LivenessResponse { status: "alive", timestamp: now_epoch_secs() })
}

async fn readyz<C: Clock>(
    State(health): State<Arc<HealthManager<C>>>,
) -> (StatusCode, AxumJson<ReadinessResponse>) {
    let status = health.status();
    (
        StatusCode::OK,
        AxumJson(ReadinessResponse { health: status, timestamp: now_epoch_secs() }),
    )
}

fn now_epoch_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
