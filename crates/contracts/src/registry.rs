// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use async_trait::async_trait;
use strata_core::RuntimeError;

/// The remembered-path store: the set of directories the user has asked the daemon to index.
///
/// Excluded from this workspace's scope; consumed only for listing and startup/rebuild
/// cleanup. A `nil` registry collaborator makes `validate_and_clean_paths` return an empty
/// removed list rather than failing the caller.
#[async_trait]
pub trait Registry: Send + Sync + 'static {
    async fn list_paths(&self) -> Result<Vec<PathBuf>, RuntimeError>;

    /// Remove remembered paths whose backing directory no longer exists, returning the
    /// removed set.
    async fn validate_and_clean_paths(&self) -> Result<Vec<PathBuf>, RuntimeError>;

    async fn add_path(&self, path: PathBuf) -> Result<(), RuntimeError>;

    async fn remove_path(&self, path: &PathBuf) -> Result<(), RuntimeError>;
}
