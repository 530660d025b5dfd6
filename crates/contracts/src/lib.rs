// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Narrow collaborator contracts consumed by the runtime core.
//!
//! The walker, the remembered-path registry, the reconciliation cleaner, the graph client,
//! and the HTTP surface are all excluded from this workspace's scope and are modeled here as
//! `async_trait` object-safe traits so `strata-components`/`strata-jobs`/`strata-daemon` can
//! hold them behind `Arc<dyn Trait>` without depending on any concrete implementation.

mod cleaner;
mod graph;
mod health_updater;
mod http_surface;
mod registry;
mod walker;
mod watcher;

pub use cleaner::{Cleaner, ReconcileOutcome};
pub use graph::Graph;
pub use health_updater::HealthUpdater;
pub use http_surface::HttpSurface;
pub use registry::Registry;
pub use walker::{Walker, WalkerStats};
pub use watcher::{Watcher, WatcherStats};
