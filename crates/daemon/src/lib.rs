// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! strata-daemon: wires the runtime kernel's crates together (registry, builder, supervisor,
//! bus, health, jobs) behind a single process lifecycle, a PID file, and an HTTP surface.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod pidfile;

pub use config::DaemonConfig;
pub use http::AxumHttpSurface;
pub use lifecycle::Daemon;
pub use pidfile::PidFile;
