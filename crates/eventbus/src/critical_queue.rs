// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable bounded FIFO backing store for designated critical event types.
//!
//! Storage shape is a local single-file embedded append log: length-prefixed JSON records
//! in the style of a write-ahead log's `open`/`append`/`next_unprocessed` cycle. Unlike a
//! plain WAL, this log is capacity-bounded with drop-oldest semantics rather than an
//! unbounded sequential replay, so every mutation — insert or dequeue — is itself logged as
//! a record; replaying the whole file in order reconstructs the exact in-memory window
//! regardless of how large the file has grown.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use strata_core::{CriticalQueueEntry, EventPayload, RuntimeError};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Serialize, Deserialize)]
enum QueueRecord {
    Insert(CriticalQueueEntry),
    Dequeued(u64),
}

struct Inner {
    deque: VecDeque<CriticalQueueEntry>,
    next_id: u64,
    file: File,
}

/// Durable, capacity-bounded FIFO. Writes and reads are each a single lock acquisition; no
/// separate transaction mechanism is needed because the backing store is a single process
/// local file, guarded by one `Mutex` over both the deque and the file handle.
pub struct CriticalQueue {
    inner: Mutex<Inner>,
    cap: usize,
    closed: Mutex<bool>,
    path: PathBuf,
}

impl CriticalQueue {
    /// Opens (creating if absent) the append log at `path`, replaying it to reconstruct the
    /// current bounded window.
    pub fn open(path: impl AsRef<Path>, cap: usize) -> Result<Self, RuntimeError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut deque: VecDeque<CriticalQueueEntry> = VecDeque::new();
        let mut next_id = 0u64;

        if path.exists() {
            let read_file = File::open(&path)?;
            let mut reader = BufReader::new(read_file);
            loop {
                let mut len_buf = [0u8; 4];
                match reader.read_exact(&mut len_buf) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                    Err(e) => return Err(RuntimeError::Io(e)),
                }
                let len = u32::from_le_bytes(len_buf) as usize;
                let mut body = vec![0u8; len];
                reader.read_exact(&mut body)?;
                let record: QueueRecord = serde_json::from_slice(&body)?;
                match record {
                    QueueRecord::Insert(entry) => {
                        next_id = next_id.max(entry.id + 1);
                        deque.push_back(entry);
                        while deque.len() > cap {
                            deque.pop_front();
                        }
                    }
                    QueueRecord::Dequeued(id) => {
                        if let Some(front) = deque.front() {
                            if front.id == id {
                                deque.pop_front();
                            } else {
                                deque.retain(|e| e.id != id);
                            }
                        }
                    }
                }
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            inner: Mutex::new(Inner { deque, next_id, file }),
            cap,
            closed: Mutex::new(false),
            path,
        })
    }

    /// Insert a new entry, dropping the single oldest row first if at capacity.
    pub fn enqueue(&self, payload: EventPayload) -> Result<(), RuntimeError> {
        if *self.closed.lock() {
            return Err(RuntimeError::BusClosed);
        }
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let entry =
            CriticalQueueEntry { id, payload, created_at: SystemTime::now() };

        if inner.deque.len() >= self.cap {
            if let Some(oldest) = inner.deque.pop_front() {
                append_record(&mut inner.file, &QueueRecord::Dequeued(oldest.id))?;
            }
        }
        append_record(&mut inner.file, &QueueRecord::Insert(entry.clone()))?;
        inner.deque.push_back(entry);
        trace!(queue_len = inner.deque.len(), "critical queue enqueued");
        Ok(())
    }

    /// Blocks with short polling until one row exists, then removes and returns the oldest.
    pub async fn dequeue(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<CriticalQueueEntry>, RuntimeError> {
        loop {
            if *self.closed.lock() {
                return Ok(None);
            }
            {
                let mut inner = self.inner.lock();
                if let Some(entry) = inner.deque.pop_front() {
                    append_record(&mut inner.file, &QueueRecord::Dequeued(entry.id))?;
                    return Ok(Some(entry));
                }
            }
            tokio::select! {
                _ = cancel.cancelled() => return Ok(None),
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().deque.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn close(&self) {
        *self.closed.lock() = true;
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

fn append_record(file: &mut File, record: &QueueRecord) -> Result<(), RuntimeError> {
    let body = serde_json::to_vec(record)?;
    let len = (body.len() as u32).to_le_bytes();
    file.write_all(&len)?;
    file.write_all(&body)?;
    file.flush().map_err(|e| {
        warn!(error = %e, "failed to flush critical queue append log");
        RuntimeError::Io(e)
    })
}

#[cfg(test)]
#[path = "critical_queue_tests.rs"]
mod tests;
