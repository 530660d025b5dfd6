// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: `OJD_*` environment variables take priority, falling back to an
//! optional TOML file, falling back to documented defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

const DEFAULT_BIND: &str = "127.0.0.1:7600";
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    pub bind_addr: String,
    pub shutdown_timeout: Duration,
    pub pid_path: PathBuf,
    pub rebuild_interval: Duration,
    pub config_path: Option<PathBuf>,
}

/// Shape of the optional TOML config file; every field is optional so a partial file only
/// overrides what it names.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind_addr: Option<String>,
    shutdown_timeout_secs: Option<u64>,
    pid_path: Option<PathBuf>,
    rebuild_interval_secs: Option<u64>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            pid_path: default_pid_path(),
            rebuild_interval: Duration::from_secs(300),
            config_path: default_config_path(),
        }
    }
}

impl DaemonConfig {
    /// `OJD_*` env vars, then the TOML file at `OJD_CONFIG_PATH` (or the XDG default if that
    /// var is unset and the default path exists), then struct defaults.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(path) = &config.config_path {
            if path.exists() {
                match read_file_config(path) {
                    Ok(file) => config.apply_file(file),
                    Err(err) => warn!(path = %path.display(), error = %err, "failed to parse config file; ignoring"),
                }
            }
        }

        config.apply_env();
        config
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(bind_addr) = file.bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(secs) = file.shutdown_timeout_secs {
            self.shutdown_timeout = Duration::from_secs(secs);
        }
        if let Some(pid_path) = file.pid_path {
            self.pid_path = pid_path;
        }
        if let Some(secs) = file.rebuild_interval_secs {
            self.rebuild_interval = Duration::from_secs(secs);
        }
    }

    fn apply_env(&mut self) {
        if let Ok(bind_addr) = std::env::var("OJD_BIND_ADDR") {
            self.bind_addr = bind_addr;
        }
        if let Some(secs) = env_u64("OJD_SHUTDOWN_TIMEOUT_SECS") {
            self.shutdown_timeout = Duration::from_secs(secs);
        }
        if let Ok(pid_path) = std::env::var("OJD_PID_PATH") {
            self.pid_path = PathBuf::from(pid_path);
        }
        if let Some(secs) = env_u64("OJD_REBUILD_INTERVAL_SECS") {
            self.rebuild_interval = Duration::from_secs(secs);
        }
    }

    /// Re-reads the TOML file (if any) and reports whether `bind_addr` or `shutdown_timeout`
    /// changed, for `Daemon::trigger_config_reload`.
    pub fn reload(&self) -> Result<Self, String> {
        let mut reloaded = Self::default();
        reloaded.config_path = self.config_path.clone();
        reloaded.pid_path = self.pid_path.clone();

        if let Some(path) = &reloaded.config_path {
            if path.exists() {
                let file = read_file_config(path).map_err(|e| e.to_string())?;
                reloaded.apply_file(file);
            }
        }
        reloaded.apply_env();
        Ok(reloaded)
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

fn read_file_config(path: &Path) -> Result<FileConfig, toml::de::Error> {
    let raw = std::fs::read_to_string(path).unwrap_or_default();
    toml::from_str(&raw)
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("OJD_CONFIG_PATH") {
        return Some(PathBuf::from(explicit));
    }
    dirs_home().map(|home| home.join(".config/ojd/config.toml"))
}

fn default_pid_path() -> PathBuf {
    dirs_home()
        .map(|home| home.join(".local/state/ojd/ojd.pid"))
        .unwrap_or_else(|| PathBuf::from("/tmp/ojd.pid"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
