// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use strata_core::RuntimeError;

/// Point-in-time counters exposed by the walker, polled by the health collector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkerStats {
    pub files_discovered: u64,
    pub dirs_traversed: u64,
    pub is_walking: bool,
}

/// The file-walking collaborator, excluded from this workspace's scope.
///
/// Implementations own their own concurrency; the core only ever calls these methods from
/// `JobManager` under its rebuild mutex, so `Walk`/`WalkAll`/`WalkAllIncremental` need
/// not be internally serialized against each other.
#[async_trait]
pub trait Walker: Send + Sync + 'static {
    /// Walk a single remembered root, publishing discovery events as files are found.
    async fn walk(&self, path: &Path) -> Result<(), RuntimeError>;

    /// Walk every remembered root from scratch.
    async fn walk_all(&self) -> Result<(), RuntimeError>;

    /// Walk every remembered root, skipping files unchanged since the last walk.
    async fn walk_all_incremental(&self) -> Result<(), RuntimeError>;

    fn stats(&self) -> WalkerStats;

    /// Drain and return the set of paths discovered since the last drain.
    fn drain_discovered_paths(&self) -> HashSet<PathBuf>;
}
