// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use strata_core::RuntimeError;

/// Outcome of reconciling one remembered root against a freshly discovered path set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub stale_removed: Vec<PathBuf>,
    pub duration: Duration,
}

/// Compares paths just discovered by the walker against persisted state and removes stale
/// entries. Excluded from this workspace's scope; reconciliation failures for one root are
/// logged and do not fail the enclosing rebuild job.
#[async_trait]
pub trait Cleaner: Send + Sync + 'static {
    async fn reconcile(
        &self,
        root: &Path,
        discovered: &HashSet<PathBuf>,
    ) -> Result<ReconcileOutcome, RuntimeError>;

    async fn delete_path(&self, path: &Path) -> Result<(), RuntimeError>;
}
