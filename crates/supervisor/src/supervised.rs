// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use strata_core::RuntimeError;
use tokio::sync::mpsc;

/// A component the supervisor knows how to start and, optionally, how to hear about fatal
/// failures from once running.
///
/// `start` is the blocking initialization call: it returns once the component is up, not when
/// it eventually stops. Components that run indefinitely internally (a filesystem watcher, a
/// graph client's connection loop) return from `start` quickly and then report failure, if
/// any, through `fatal_channel` rather than through `start`'s return value.
#[async_trait]
pub trait Supervised: Send + Sync + 'static {
    async fn start(&self) -> Result<(), RuntimeError>;

    /// A one-way stream of fatal errors from the now-running component. `None` means the
    /// component never fails out-of-band; the supervisor then only reacts to cancellation.
    fn fatal_channel(&self) -> Option<mpsc::Receiver<RuntimeError>> {
        None
    }
}
