// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The declarative component graph. Holds [`ComponentDefinition`]s keyed by name and
//! resolves a build order that respects `dependencies`.

use std::collections::{HashMap, HashSet};

use strata_core::{ComponentKind, ComponentName, RuntimeError};
use tracing::{debug, warn};

use crate::definition::ComponentDefinition;

#[derive(Debug, Default)]
pub struct ComponentRegistry {
    defs: HashMap<ComponentName, ComponentDefinition>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing any prior one with the same name.
    pub fn register(&mut self, def: ComponentDefinition) {
        if self.defs.contains_key(&def.name) {
            warn!(component = %def.name, "overwriting existing component definition");
        } else {
            debug!(component = %def.name, "registered component definition");
        }
        self.defs.insert(def.name.clone(), def);
    }

    pub fn get(&self, name: &ComponentName) -> Option<&ComponentDefinition> {
        self.defs.get(name)
    }

    pub fn filter_by_kind(&self, kind: ComponentKind) -> Vec<ComponentName> {
        let mut names: Vec<ComponentName> = self
            .defs
            .values()
            .filter(|d| d.kind == kind)
            .map(|d| d.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Kahn's algorithm over the `dependencies` edges. Returns a build order where every
    /// component appears after all of its dependencies.
    ///
    /// Errors with [`RuntimeError::Graph`] naming the offending component if a dependency is
    /// not registered, or if the graph contains a cycle.
    #[allow(clippy::expect_used)]
    pub fn topological_order(&self) -> Result<Vec<ComponentName>, RuntimeError> {
        for def in self.defs.values() {
            for dep in &def.dependencies {
                if !self.defs.contains_key(dep) {
                    return Err(RuntimeError::Graph(format!(
                        "component '{}' depends on unregistered component '{}'",
                        def.name, dep
                    )));
                }
            }
        }

        let mut in_degree: HashMap<ComponentName, usize> =
            self.defs.keys().map(|name| (name.clone(), 0)).collect();
        let mut dependents: HashMap<ComponentName, Vec<ComponentName>> = HashMap::new();

        for def in self.defs.values() {
            for dep in &def.dependencies {
                *in_degree.get_mut(&def.name).expect("seeded above") += 1;
                dependents.entry(dep.clone()).or_default().push(def.name.clone());
            }
        }

        let mut ready: Vec<ComponentName> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(name, _)| name.clone())
            .collect();
        ready.sort();

        let mut order = Vec::with_capacity(self.defs.len());
        let mut queue: std::collections::VecDeque<ComponentName> = ready.into();

        while let Some(name) = queue.pop_front() {
            order.push(name.clone());
            if let Some(children) = dependents.get(&name) {
                let mut newly_ready = Vec::new();
                for child in children {
                    let deg = in_degree.get_mut(child).expect("seeded above");
                    *deg -= 1;
                    if *deg == 0 {
                        newly_ready.push(child.clone());
                    }
                }
                newly_ready.sort();
                for child in newly_ready {
                    queue.push_back(child);
                }
            }
        }

        if order.len() != self.defs.len() {
            let stuck: HashSet<ComponentName> = self
                .defs
                .keys()
                .filter(|name| !order.contains(name))
                .cloned()
                .collect();
            let mut names: Vec<String> = stuck.iter().map(|n| n.to_string()).collect();
            names.sort();
            return Err(RuntimeError::Graph(format!(
                "dependency cycle among components: {}",
                names.join(", ")
            )));
        }

        Ok(order)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
