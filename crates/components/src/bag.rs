// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strongly typed holder mapping each known component role to at most one built instance.
//! Built once during `ComponentBuilder::build`; read-only thereafter.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use strata_contracts::{Cleaner, Graph, Registry, Walker, Watcher};
use strata_core::{ComponentName, SystemClock};
use strata_eventbus::{CriticalQueue, EventBus};
use strata_health::HealthManager;

/// The concrete health manager type wired into the bag. The daemon always runs against the
/// real clock; tests that need a controllable clock construct a bare `HealthManager<FakeClock>`
/// directly rather than through a built bag.
pub type DefaultHealthManager = HealthManager<SystemClock>;

/// The role a `ComponentDefinition` declares, used by the builder to dispatch the built value
/// into the matching bag slot instead of relying on runtime type introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentRole {
    Bus,
    HealthManager,
    Registry,
    Graph,
    Walker,
    Watcher,
    Cleaner,
    Queue,
    Cache,
    Provider,
    Mcp,
    Metrics,
}

/// A built component's value, tagged by the role it fills. `Cache`/`Provider`/`Mcp`/`Metrics`
/// have no narrow trait in `strata-contracts` (they are entirely out of this workspace's
/// scope), so they are held as type-erased `Arc<dyn Any + Send + Sync>` and downcast by the
/// caller that knows the concrete type it registered.
#[derive(Clone)]
pub enum BuiltValue {
    Bus(Arc<EventBus>),
    HealthManager(Arc<DefaultHealthManager>),
    Registry(Arc<dyn Registry>),
    Graph(Arc<dyn Graph>),
    Walker(Arc<dyn Walker>),
    Watcher(Arc<dyn Watcher>),
    Cleaner(Arc<dyn Cleaner>),
    Queue(Arc<CriticalQueue>),
    Cache(Arc<dyn Any + Send + Sync>),
    Provider(Arc<dyn Any + Send + Sync>),
    Mcp(Arc<dyn Any + Send + Sync>),
    Metrics(Arc<dyn Any + Send + Sync>),
}

impl BuiltValue {
    pub fn role(&self) -> ComponentRole {
        match self {
            BuiltValue::Bus(_) => ComponentRole::Bus,
            BuiltValue::HealthManager(_) => ComponentRole::HealthManager,
            BuiltValue::Registry(_) => ComponentRole::Registry,
            BuiltValue::Graph(_) => ComponentRole::Graph,
            BuiltValue::Walker(_) => ComponentRole::Walker,
            BuiltValue::Watcher(_) => ComponentRole::Watcher,
            BuiltValue::Cleaner(_) => ComponentRole::Cleaner,
            BuiltValue::Queue(_) => ComponentRole::Queue,
            BuiltValue::Cache(_) => ComponentRole::Cache,
            BuiltValue::Provider(_) => ComponentRole::Provider,
            BuiltValue::Mcp(_) => ComponentRole::Mcp,
            BuiltValue::Metrics(_) => ComponentRole::Metrics,
        }
    }
}

/// Write-once during `Build`; read-only thereafter.
#[derive(Clone, Default)]
pub struct ComponentBag {
    pub bus: Option<Arc<EventBus>>,
    pub health_manager: Option<Arc<DefaultHealthManager>>,
    pub registry: Option<Arc<dyn Registry>>,
    pub graph: Option<Arc<dyn Graph>>,
    pub walker: Option<Arc<dyn Walker>>,
    pub watcher: Option<Arc<dyn Watcher>>,
    pub cleaner: Option<Arc<dyn Cleaner>>,
    pub queue: Option<Arc<CriticalQueue>>,
    pub caches: HashMap<ComponentName, Arc<dyn Any + Send + Sync>>,
    pub providers: HashMap<ComponentName, Arc<dyn Any + Send + Sync>>,
    pub mcp: Option<Arc<dyn Any + Send + Sync>>,
    pub metrics: Option<Arc<dyn Any + Send + Sync>>,
}

impl ComponentBag {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Dispatch on the built value's role tag; concrete single slots (bus, registry, ...)
    /// take the value directly, multi-instance roles (cache, provider) key by component name.
    pub(crate) fn assign(&mut self, name: ComponentName, value: BuiltValue) {
        match value {
            BuiltValue::Bus(v) => self.bus = Some(v),
            BuiltValue::HealthManager(v) => self.health_manager = Some(v),
            BuiltValue::Registry(v) => self.registry = Some(v),
            BuiltValue::Graph(v) => self.graph = Some(v),
            BuiltValue::Walker(v) => self.walker = Some(v),
            BuiltValue::Watcher(v) => self.watcher = Some(v),
            BuiltValue::Cleaner(v) => self.cleaner = Some(v),
            BuiltValue::Queue(v) => self.queue = Some(v),
            BuiltValue::Cache(v) => {
                self.caches.insert(name, v);
            }
            BuiltValue::Provider(v) => {
                self.providers.insert(name, v);
            }
            BuiltValue::Mcp(v) => self.mcp = Some(v),
            BuiltValue::Metrics(v) => self.metrics = Some(v),
        }
    }
}

impl std::fmt::Debug for ComponentBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentBag")
            .field("bus", &self.bus.is_some())
            .field("health_manager", &self.health_manager.is_some())
            .field("registry", &self.registry.is_some())
            .field("graph", &self.graph.is_some())
            .field("walker", &self.walker.is_some())
            .field("watcher", &self.watcher.is_some())
            .field("cleaner", &self.cleaner.is_some())
            .field("queue", &self.queue.is_some())
            .field("caches", &self.caches.len())
            .field("providers", &self.providers.len())
            .field("mcp", &self.mcp.is_some())
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}
