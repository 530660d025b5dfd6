// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The row shape of the durable critical-event queue.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::event::EventPayload;

/// One row in the durable queue. Order is strictly by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalQueueEntry {
    pub id: u64,
    pub payload: EventPayload,
    pub created_at: SystemTime,
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
