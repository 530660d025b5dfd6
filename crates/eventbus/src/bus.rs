// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pub/sub fan-out with bounded per-subscriber buffers and a critical-event durable queue.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use strata_core::{Event, EventType, RuntimeError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::critical_queue::CriticalQueue;

/// Default bound on each subscriber's delivery channel.
pub const DEFAULT_BUFFER_SIZE: usize = 100;

const DRAIN_RETRY_BACKOFF: Duration = Duration::from_secs(1);

struct SubscriberEntry {
    filter: Option<EventType>,
    tx: mpsc::Sender<Event>,
}

struct StatsState {
    last_sampled_at: Instant,
    last_drop_count: u64,
}

/// A handle returned by [`EventBus::subscribe`]/[`EventBus::subscribe_all`]. Dropping it does
/// nothing by itself — call [`Subscription::unsubscribe`] explicitly, matching the source's
/// explicit unsubscribe-function contract rather than Drop-based cleanup.
pub struct Subscription {
    id: u64,
    bus: Arc<EventBus>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn unsubscribe(self) {
        self.bus.remove_subscriber(self.id);
    }
}

/// Snapshot returned by [`EventBus::stats`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusStats {
    pub subscriber_count: usize,
    pub closed: bool,
    pub drop_count: u64,
    /// Events/sec dropped since the previous `stats()` call.
    pub drop_rate: f64,
    pub critical_queue_len: usize,
    pub critical_queue_cap: usize,
}

/// Single bus, process-wide, owned by the daemon. Non-blocking fan-out to N subscribers.
pub struct EventBus {
    subs: RwLock<HashMap<u64, SubscriberEntry>>,
    next_sub_id: AtomicU64,
    closed: AtomicBool,
    drop_count: AtomicU64,
    buffer_size: usize,
    critical_set: std::collections::HashSet<EventType>,
    critical_queue: Option<Arc<CriticalQueue>>,
    drain_cancel: CancellationToken,
    stats_state: Mutex<StatsState>,
}

impl EventBus {
    pub fn new(
        buffer_size: usize,
        critical_set: std::collections::HashSet<EventType>,
        critical_queue: Option<Arc<CriticalQueue>>,
    ) -> Arc<Self> {
        let bus = Arc::new(Self {
            subs: RwLock::new(HashMap::new()),
            next_sub_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            drop_count: AtomicU64::new(0),
            buffer_size,
            critical_set,
            critical_queue,
            drain_cancel: CancellationToken::new(),
            stats_state: Mutex::new(StatsState {
                last_sampled_at: Instant::now(),
                last_drop_count: 0,
            }),
        });

        if bus.critical_queue.is_some() {
            EventBus::spawn_drain_task(Arc::clone(&bus));
        }

        bus
    }

    /// Publish an event. Never blocks: backpressure is absorbed by drops (non-critical) or
    /// by the capacity-bounded critical queue.
    pub fn publish(&self, cancel: &CancellationToken, event: Event) -> Result<(), RuntimeError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RuntimeError::BusClosed);
        }

        if event.is_critical(&self.critical_set) {
            if let Some(queue) = &self.critical_queue {
                queue.enqueue(event.payload)?;
                return Ok(());
            }
        }

        self.fan_out(cancel, &event);
        Ok(())
    }

    fn fan_out(&self, cancel: &CancellationToken, event: &Event) {
        let subs = self.subs.read();
        for entry in subs.values() {
            if let Some(filter) = entry.filter {
                if filter != event.event_type() {
                    continue;
                }
            }
            match entry.tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Closed(_)) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if cancel.is_cancelled() {
                        // Priority: ctx.Done over the default-drop branch.
                        continue;
                    }
                    self.drop_count.fetch_add(1, Ordering::Relaxed);
                    warn!(event_type = %event.event_type(), "event bus dropped event for a slow subscriber");
                }
            }
        }
    }

    /// Subscribe to a single event type. `handler` runs on a dedicated delivery task with
    /// panic recovery: a panic is logged and delivery continues for subsequent events.
    pub fn subscribe(
        self: &Arc<Self>,
        event_type: EventType,
        handler: impl Fn(Event) + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribe_inner(Some(event_type), handler)
    }

    /// Subscribe to every event type.
    pub fn subscribe_all(
        self: &Arc<Self>,
        handler: impl Fn(Event) + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribe_inner(None, handler)
    }

    fn subscribe_inner(
        self: &Arc<Self>,
        filter: Option<EventType>,
        handler: impl Fn(Event) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_sub_id.fetch_add(1, Ordering::Relaxed);
        let (tx, mut rx) = mpsc::channel::<Event>(self.buffer_size);
        self.subs.write().insert(id, SubscriberEntry { filter, tx });

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let event_type = event.event_type();
                let result =
                    std::panic::catch_unwind(AssertUnwindSafe(|| handler(event)));
                if let Err(_panic) = result {
                    warn!(subscription_id = id, %event_type, "subscriber handler panicked; continuing delivery");
                }
            }
        });

        Subscription { id, bus: Arc::clone(self) }
    }

    fn remove_subscriber(&self, id: u64) {
        self.subs.write().remove(&id);
    }

    /// Idempotent. Stops the drain loop, closes the critical queue, and closes every
    /// subscription's channel exactly once.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.drain_cancel.cancel();
        if let Some(queue) = &self.critical_queue {
            queue.close();
        }
        self.subs.write().clear();
    }

    pub fn stats(&self) -> BusStats {
        let drop_count = self.drop_count.load(Ordering::Relaxed);
        let mut state = self.stats_state.lock();
        let elapsed = state.last_sampled_at.elapsed().as_secs_f64();
        let drop_rate = if elapsed > 0.0 {
            (drop_count.saturating_sub(state.last_drop_count)) as f64 / elapsed
        } else {
            0.0
        };
        state.last_sampled_at = Instant::now();
        state.last_drop_count = drop_count;

        BusStats {
            subscriber_count: self.subs.read().len(),
            closed: self.closed.load(Ordering::Acquire),
            drop_count,
            drop_rate,
            critical_queue_len: self.critical_queue.as_ref().map_or(0, |q| q.len()),
            critical_queue_cap: self.critical_queue.as_ref().map_or(0, |q| q.cap()),
        }
    }

    fn spawn_drain_task(bus: Arc<EventBus>) {
        tokio::spawn(async move {
            let cancel = bus.drain_cancel.clone();
            loop {
                if cancel.is_cancelled() {
                    return;
                }
                let Some(queue) = bus.critical_queue.clone() else { return };
                match queue.dequeue(&cancel).await {
                    Ok(Some(entry)) => {
                        let event = Event::new(entry.created_at, entry.payload);
                        trace!(event_type = %event.event_type(), "critical queue drain delivering event");
                        bus.fan_out(&cancel, &event);
                    }
                    Ok(None) => {
                        if cancel.is_cancelled() {
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "critical queue drain failed; retrying");
                        tokio::select! {
                            _ = cancel.cancelled() => return,
                            _ = tokio::time::sleep(DRAIN_RETRY_BACKOFF) => {}
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
