// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Point-in-time counters exposed by the filesystem watcher, polled by the health collector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatcherStats {
    pub events_observed: u64,
    pub degraded: bool,
}

/// The filesystem watcher collaborator, excluded from this workspace's scope. The core only
/// ever polls its stats for health aggregation; watch-loop errors surface as
/// `watcher.degraded`/`watcher.recovered` events published by the watcher itself.
pub trait Watcher: Send + Sync + 'static {
    fn stats(&self) -> WatcherStats;
}
