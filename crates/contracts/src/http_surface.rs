// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use strata_core::RuntimeError;
use tokio_util::sync::CancellationToken;

/// The HTTP surface layer the core registers routes against but does not implement the
/// transport for. Implementations expose at
/// least `/healthz` and `/readyz`; `crates/daemon` ships the reference `axum` implementation.
#[async_trait]
pub trait HttpSurface: Send + Sync + 'static {
    /// Run until `shutdown` is cancelled or the surface fails irrecoverably.
    async fn serve(&self, shutdown: CancellationToken) -> Result<(), RuntimeError>;
}
