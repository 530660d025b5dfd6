// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use strata_core::{ComponentKind, ComponentName, Criticality, RestartPolicy, RuntimeError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::bag::{BuiltValue, ComponentBag};

pub type BuildFuture = Pin<Box<dyn Future<Output = Result<Option<BuiltValue>, RuntimeError>> + Send>>;

type BuildFn = dyn Fn(&BuildContext) -> BuildFuture + Send + Sync;

/// A one-way stream of runtime errors from an already-built component, consumed by the
/// supervisor to decide restarts. Modeled as a bounded channel rather than a generic
/// "event source" since the supervisor only ever needs a single receiver.
pub type FatalChannel = mpsc::Receiver<RuntimeError>;

type FatalChannelFn = dyn Fn(&BuiltValue) -> Option<FatalChannel> + Send + Sync;

/// The bag assembled so far, handed to each definition's build function in topological
/// order, plus the cancellation token persistent components should honor once supervised.
pub struct BuildContext<'a> {
    pub bag: &'a ComponentBag,
    pub cancellation: CancellationToken,
}

/// Declarative record for one component. Definitions are created at startup and
/// never mutated; the DAG they form over `dependencies` is validated by
/// [`crate::ComponentRegistry::topological_order`].
#[derive(Clone)]
pub struct ComponentDefinition {
    pub name: ComponentName,
    pub kind: ComponentKind,
    pub criticality: Criticality,
    pub restart_policy: RestartPolicy,
    pub dependencies: Vec<ComponentName>,
    build: Arc<BuildFn>,
    fatal_channel: Option<Arc<FatalChannelFn>>,
}

impl ComponentDefinition {
    pub fn new(
        name: impl Into<ComponentName>,
        kind: ComponentKind,
        criticality: Criticality,
        restart_policy: RestartPolicy,
        build: impl Fn(&BuildContext) -> BuildFuture + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            criticality,
            restart_policy,
            dependencies: Vec::new(),
            build: Arc::new(build),
            fatal_channel: None,
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<ComponentName>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_fatal_channel(
        mut self,
        accessor: impl Fn(&BuiltValue) -> Option<FatalChannel> + Send + Sync + 'static,
    ) -> Self {
        self.fatal_channel = Some(Arc::new(accessor));
        self
    }

    pub(crate) async fn build(&self, ctx: &BuildContext<'_>) -> Result<Option<BuiltValue>, RuntimeError> {
        (self.build)(ctx).await
    }

    pub fn fatal_channel(&self, value: &BuiltValue) -> Option<FatalChannel> {
        self.fatal_channel.as_ref().and_then(|accessor| accessor(value))
    }
}

impl std::fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("criticality", &self.criticality)
            .field("restart_policy", &self.restart_policy)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
