// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The runtime's error taxonomy, as explicit enum variants rather than string-sniffed kinds.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A `fatal` component failed to build; daemon startup aborts.
    #[error("component {component} failed to build: {source}")]
    BuildFatal {
        component: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A dependency cycle or a reference to an unregistered component.
    #[error("component graph error: {0}")]
    Graph(String),

    /// The bus has been closed; publishers must stop.
    #[error("event bus is closed")]
    BusClosed,

    /// A concurrency contract was violated by the caller (e.g. double `start` on a
    /// supervision loop for the same component).
    #[error("concurrency contract violation: {0}")]
    ConcurrencyViolation(String),

    /// Another instance of the daemon already holds the PID file.
    #[error("daemon already running (pid {0})")]
    AlreadyRunning(i32),

    /// Any I/O failure surfaced from the filesystem (PID file, critical queue, config).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or out-of-range PID file contents.
    #[error("invalid pid file contents: {0}")]
    InvalidPidFile(String),

    /// A critical-queue entry failed to (de)serialize.
    #[error("critical queue codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// One or more registered config-reload callbacks failed; all callbacks still ran.
    #[error("config reload failed: {0}")]
    ConfigReload(String),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
