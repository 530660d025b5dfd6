// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event model shared across the bus, health collector, and job runner.
//!
//! An [`Event`] is `{ type, timestamp, payload }`; for every [`EventType`] there is exactly
//! one payload shape, enforced by construction (each `EventType` variant has a matching
//! `Event::*` constructor) rather than by a separate runtime validator.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::health::RunResult;

/// The three partitions event types fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    FilePath,
    AnalysisGraph,
    LifecycleJob,
}

/// Discriminant for an event's type, independent of its payload. Used for subscription
/// filters and for membership in the critical set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    FileDiscovered,
    FileChanged,
    PathDeleted,
    AnalysisComplete,
    AnalysisFailed,
    AnalysisSemanticFailed,
    AnalysisEmbeddingsFailed,
    AnalysisSkipped,
    AnalysisSemanticComplete,
    AnalysisEmbeddingsComplete,
    GraphPersistenceFailed,
    GraphFatal,
    GraphConnected,
    GraphDisconnected,
    GraphWriteQueueFull,
    QueueDegradationChanged,
    WatcherDegraded,
    WatcherRecovered,
    ConfigReloaded,
    ConfigReloadFailed,
    RememberedPathAdded,
    RememberedPathUpdated,
    RememberedPathRemoved,
    RebuildStarted,
    RebuildComplete,
    JobStarted,
    JobCompleted,
    JobFailed,
}

crate::simple_display! {
    EventType {
        FileDiscovered => "file.discovered",
        FileChanged => "file.changed",
        PathDeleted => "path.deleted",
        AnalysisComplete => "analysis.complete",
        AnalysisFailed => "analysis.failed",
        AnalysisSemanticFailed => "analysis.semantic_failed",
        AnalysisEmbeddingsFailed => "analysis.embeddings_failed",
        AnalysisSkipped => "analysis.skipped",
        AnalysisSemanticComplete => "analysis.semantic_complete",
        AnalysisEmbeddingsComplete => "analysis.embeddings_complete",
        GraphPersistenceFailed => "graph.persistence_failed",
        GraphFatal => "graph.fatal",
        GraphConnected => "graph.connected",
        GraphDisconnected => "graph.disconnected",
        GraphWriteQueueFull => "graph.write_queue_full",
        QueueDegradationChanged => "queue.degradation_changed",
        WatcherDegraded => "watcher.degraded",
        WatcherRecovered => "watcher.recovered",
        ConfigReloaded => "config.reloaded",
        ConfigReloadFailed => "config.reload_failed",
        RememberedPathAdded => "remembered_path.added",
        RememberedPathUpdated => "remembered_path.updated",
        RememberedPathRemoved => "remembered_path.removed",
        RebuildStarted => "rebuild.started",
        RebuildComplete => "rebuild.complete",
        JobStarted => "job.started",
        JobCompleted => "job.completed",
        JobFailed => "job.failed",
    }
}

impl EventType {
    pub fn class(self) -> EventClass {
        use EventType::*;
        match self {
            FileDiscovered | FileChanged | PathDeleted | RememberedPathAdded
            | RememberedPathUpdated | RememberedPathRemoved => EventClass::FilePath,
            AnalysisComplete | AnalysisFailed | AnalysisSemanticFailed
            | AnalysisEmbeddingsFailed | AnalysisSkipped | AnalysisSemanticComplete
            | AnalysisEmbeddingsComplete | GraphPersistenceFailed | GraphFatal
            | GraphConnected | GraphDisconnected | GraphWriteQueueFull
            | QueueDegradationChanged | WatcherDegraded | WatcherRecovered => {
                EventClass::AnalysisGraph
            }
            ConfigReloaded | ConfigReloadFailed | RebuildStarted | RebuildComplete
            | JobStarted | JobCompleted | JobFailed => EventClass::LifecycleJob,
        }
    }

    /// Default critical set: events whose loss would corrupt downstream state.
    pub fn is_critical_by_default(self) -> bool {
        matches!(self, EventType::PathDeleted | EventType::FileDiscovered)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EventPayload {
    #[serde(rename = "file.discovered")]
    FileDiscovered { path: PathBuf },
    #[serde(rename = "file.changed")]
    FileChanged { path: PathBuf },
    #[serde(rename = "path.deleted")]
    PathDeleted { path: PathBuf },
    #[serde(rename = "analysis.complete")]
    AnalysisComplete { path: PathBuf },
    #[serde(rename = "analysis.failed")]
    AnalysisFailed { path: PathBuf, error: String },
    #[serde(rename = "analysis.semantic_failed")]
    AnalysisSemanticFailed { path: PathBuf, error: String },
    #[serde(rename = "analysis.embeddings_failed")]
    AnalysisEmbeddingsFailed { path: PathBuf, error: String },
    #[serde(rename = "analysis.skipped")]
    AnalysisSkipped { path: PathBuf, reason: String },
    #[serde(rename = "analysis.semantic_complete")]
    AnalysisSemanticComplete { path: PathBuf },
    #[serde(rename = "analysis.embeddings_complete")]
    AnalysisEmbeddingsComplete { path: PathBuf },
    #[serde(rename = "graph.persistence_failed")]
    GraphPersistenceFailed { path: PathBuf, error: String },
    #[serde(rename = "graph.fatal")]
    GraphFatal { error: String },
    #[serde(rename = "graph.connected")]
    GraphConnected,
    #[serde(rename = "graph.disconnected")]
    GraphDisconnected { error: String },
    #[serde(rename = "graph.write_queue_full")]
    GraphWriteQueueFull { pending: u64 },
    #[serde(rename = "queue.degradation_changed")]
    QueueDegradationChanged { degraded: bool },
    #[serde(rename = "watcher.degraded")]
    WatcherDegraded { reason: String },
    #[serde(rename = "watcher.recovered")]
    WatcherRecovered,
    #[serde(rename = "config.reloaded")]
    ConfigReloaded,
    #[serde(rename = "config.reload_failed")]
    ConfigReloadFailed { error: String },
    #[serde(rename = "remembered_path.added")]
    RememberedPathAdded { path: PathBuf },
    #[serde(rename = "remembered_path.updated")]
    RememberedPathUpdated { path: PathBuf },
    #[serde(rename = "remembered_path.removed")]
    RememberedPathRemoved { path: PathBuf },
    #[serde(rename = "rebuild.started")]
    RebuildStarted { full: bool },
    #[serde(rename = "rebuild.complete")]
    RebuildComplete {
        files_queued: u64,
        dirs_processed: u64,
        duration_ms: u64,
        removed_paths: Vec<PathBuf>,
    },
    #[serde(rename = "job.started")]
    JobStarted { name: String, started_at: SystemTime },
    #[serde(rename = "job.completed")]
    JobCompleted { name: String, result: RunResult },
    #[serde(rename = "job.failed")]
    JobFailed { name: String, error: String },
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        use EventPayload::*;
        match self {
            FileDiscovered { .. } => EventType::FileDiscovered,
            FileChanged { .. } => EventType::FileChanged,
            PathDeleted { .. } => EventType::PathDeleted,
            AnalysisComplete { .. } => EventType::AnalysisComplete,
            AnalysisFailed { .. } => EventType::AnalysisFailed,
            AnalysisSemanticFailed { .. } => EventType::AnalysisSemanticFailed,
            AnalysisEmbeddingsFailed { .. } => EventType::AnalysisEmbeddingsFailed,
            AnalysisSkipped { .. } => EventType::AnalysisSkipped,
            AnalysisSemanticComplete { .. } => EventType::AnalysisSemanticComplete,
            AnalysisEmbeddingsComplete { .. } => EventType::AnalysisEmbeddingsComplete,
            GraphPersistenceFailed { .. } => EventType::GraphPersistenceFailed,
            GraphFatal { .. } => EventType::GraphFatal,
            GraphConnected => EventType::GraphConnected,
            GraphDisconnected { .. } => EventType::GraphDisconnected,
            GraphWriteQueueFull { .. } => EventType::GraphWriteQueueFull,
            QueueDegradationChanged { .. } => EventType::QueueDegradationChanged,
            WatcherDegraded { .. } => EventType::WatcherDegraded,
            WatcherRecovered => EventType::WatcherRecovered,
            ConfigReloaded => EventType::ConfigReloaded,
            ConfigReloadFailed { .. } => EventType::ConfigReloadFailed,
            RememberedPathAdded { .. } => EventType::RememberedPathAdded,
            RememberedPathUpdated { .. } => EventType::RememberedPathUpdated,
            RememberedPathRemoved { .. } => EventType::RememberedPathRemoved,
            RebuildStarted { .. } => EventType::RebuildStarted,
            RebuildComplete { .. } => EventType::RebuildComplete,
            JobStarted { .. } => EventType::JobStarted,
            JobCompleted { .. } => EventType::JobCompleted,
            JobFailed { .. } => EventType::JobFailed,
        }
    }
}

/// A published event: type-tagged payload plus the timestamp it was published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: SystemTime,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(timestamp: SystemTime, payload: EventPayload) -> Self {
        Self { timestamp, payload }
    }

    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }

    pub fn is_critical(&self, critical_set: &std::collections::HashSet<EventType>) -> bool {
        critical_set.contains(&self.event_type())
    }
}

/// Free-form details map shared by health/job payloads that need an open-ended bag of values.
pub type DetailsMap = HashMap<String, Value>;

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
