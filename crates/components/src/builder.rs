// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives the registry's topological order through each definition's build function,
//! assembling a [`ComponentBag`].

use strata_core::{Criticality, RuntimeError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::bag::ComponentBag;
use crate::definition::BuildContext;
use crate::registry::ComponentRegistry;

pub struct ComponentBuilder {
    registry: ComponentRegistry,
}

impl ComponentBuilder {
    pub fn new(registry: ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Build every registered component in dependency order.
    ///
    /// A `fatal` component that fails to build aborts the whole build immediately, returning
    /// [`RuntimeError::BuildFatal`] naming it; components later in the order are never invoked.
    /// A `degradable` component that fails to build is logged and left unset in the bag.
    #[allow(clippy::expect_used)]
    pub async fn build(&self, cancellation: CancellationToken) -> Result<ComponentBag, RuntimeError> {
        let order = self.registry.topological_order()?;
        let mut bag = ComponentBag::empty();

        for name in order {
            let def = self
                .registry
                .get(&name)
                .expect("topological_order only yields registered names");

            let ctx = BuildContext {
                bag: &bag,
                cancellation: cancellation.clone(),
            };

            match def.build(&ctx).await {
                Ok(Some(value)) => {
                    debug!(component = %name, role = ?value.role(), "component built");
                    bag.assign(name, value);
                }
                Ok(None) => {
                    debug!(component = %name, "component build skipped (disabled or optional)");
                }
                Err(err) => match def.criticality {
                    Criticality::Fatal => {
                        return Err(RuntimeError::BuildFatal {
                            component: name.to_string(),
                            source: Box::new(err),
                        });
                    }
                    Criticality::Degradable => {
                        warn!(component = %name, error = %err, "degradable component failed to build");
                    }
                },
            }
        }

        Ok(bag)
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
