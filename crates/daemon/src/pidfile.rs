// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-instance enforcement via an atomically written PID file.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use nix::sys::signal::kill;
use nix::unistd::Pid;
use strata_core::RuntimeError;
use tracing::{debug, warn};

/// Holds the filesystem path; every operation is an independent filesystem transaction.
/// Atomic rename provides the only synchronization needed between claimants.
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the current process id to `<path>.tmp` then renames it onto `path`, creating
    /// parent directories (mode 0755) as needed.
    pub fn write(&self) -> Result<(), RuntimeError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
            let mut perms = fs::metadata(parent)?.permissions();
            perms.set_mode(0o755);
            fs::set_permissions(parent, perms)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        let pid = std::process::id();
        fs::write(&tmp_path, pid.to_string())?;
        let mut perms = fs::metadata(&tmp_path)?.permissions();
        perms.set_mode(0o644);
        fs::set_permissions(&tmp_path, perms)?;
        fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), pid, "pid file written");
        Ok(())
    }

    /// Reads and trims the file's contents, rejecting anything that isn't a positive decimal
    /// pid.
    pub fn read(&self) -> Result<i32, RuntimeError> {
        let raw = fs::read_to_string(&self.path)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RuntimeError::InvalidPidFile("pid file is empty".into()));
        }
        let pid: i32 = trimmed
            .parse()
            .map_err(|_| RuntimeError::InvalidPidFile(format!("not a number: {trimmed:?}")))?;
        if pid <= 0 {
            return Err(RuntimeError::InvalidPidFile(format!("non-positive pid: {pid}")));
        }
        Ok(pid)
    }

    /// `false` if the file is absent. Otherwise reads the pid and probes it with a null
    /// signal: `ESRCH` (no such process) means stale; `EPERM` (permission denied) means a
    /// process is there, just not ours, so not stale; any other error propagates.
    pub fn is_stale(&self) -> Result<bool, RuntimeError> {
        if !self.path.exists() {
            return Ok(false);
        }
        let pid = self.read()?;
        match kill(Pid::from_raw(pid), None) {
            Ok(()) => Ok(false),
            Err(nix::errno::Errno::ESRCH) => Ok(true),
            Err(nix::errno::Errno::EPERM) => Ok(false),
            Err(err) => Err(RuntimeError::Io(std::io::Error::from(err))),
        }
    }

    /// Non-existence is not an error.
    pub fn remove(&self) -> Result<(), RuntimeError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(RuntimeError::Io(err)),
        }
    }

    /// Absent: write and claim. Stale: remove the dangling file then claim. Otherwise a live
    /// process already holds it: `RuntimeError::AlreadyRunning`.
    pub fn check_and_claim(&self) -> Result<(), RuntimeError> {
        if !self.path.exists() {
            return self.write();
        }
        if self.is_stale()? {
            warn!(path = %self.path.display(), "removing stale pid file");
            self.remove()?;
            return self.write();
        }
        let pid = self.read()?;
        Err(RuntimeError::AlreadyRunning(pid))
    }
}

#[cfg(test)]
#[path = "pidfile_tests.rs"]
mod tests;
