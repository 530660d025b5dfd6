// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stable, user/operator-chosen names used as map keys across the runtime.
//!
//! Unlike the random ids in [`crate::id`], these wrap a small interned string and are never
//! generated — they come from [`crate::component::ComponentDefinition::name`] or a job
//! invocation label and must stay stable across process restarts.

use smol_str::SmolStr;

macro_rules! define_name {
    ($(#[$meta:meta])* pub struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(SmolStr);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(SmolStr::new(s.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.0.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.0.as_str()
            }
        }
    };
}

define_name! {
    /// Unique, stable name of a registered component (e.g. `"bus"`, `"graph"`, `"watcher"`).
    pub struct ComponentName;
}

define_name! {
    /// Name of a job invocation (e.g. `"job.initial_walk"`, `"job.rebuild_incremental"`).
    pub struct JobName;
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod tests;
