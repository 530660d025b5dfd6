// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use strata_core::RuntimeError;
use tokio::sync::mpsc;

/// The graph store client the analysis pipeline persists results to. Excluded from this
/// workspace's scope; the core only ever checks connectivity and drains its fatal channel.
#[async_trait]
pub trait Graph: Send + Sync + 'static {
    fn is_connected(&self) -> bool;

    /// A one-way stream of fatal runtime errors, consumed by the supervisor to decide
    /// restarts.
    fn errors(&self) -> mpsc::Receiver<RuntimeError>;

    async fn start(&self) -> Result<(), RuntimeError>;

    async fn stop(&self) -> Result<(), RuntimeError>;
}
