// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable backlog of events awaiting delivery.
//!
//! Uses JSONL format for durability - each event is written as a single line
//! with one `write` call and fsynced immediately. Lines are kept in capture
//! order and never reordered.
//!
//! Anything that removes entries (a drain pass, capacity eviction) rewrites
//! the whole file through a sibling temporary file that is fsynced and then
//! renamed over the original, so a crash leaves either the old or the new
//! content and never a file with gaps.
//!
//! Readers skip lines that do not decode (torn writes, foreign content)
//! instead of failing, and [`Backlog::open`] truncates a torn tail so the
//! next append starts on a fresh line.

use std::fs::{self, File, OpenOptions};
use std::future::Future;
use std::io::{Read, Seek, SeekFrom, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use rc_core::{record, AttendanceEvent, DeliveryOutcome};
use tracing::{debug, warn};

/// Default capacity.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Error type for backlog operations.
#[derive(Debug, thiserror::Error)]
pub enum BacklogError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Another handle owns the backlog.
    #[error("backlog {} is locked by another process", path.display())]
    Locked { path: PathBuf },

    /// Event could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] rc_core::Error),
}

/// Result type for backlog operations.
pub type BacklogResult<T> = Result<T, BacklogError>;

/// What happened on [`Backlog::append`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppendReport {
    /// Oldest entry dropped to make room, if the backlog was full.
    pub evicted: Option<AttendanceEvent>,
}

/// Tally of one [`Backlog::drain_attempt`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    pub delivered: usize,
    pub rejected: usize,
    pub failed: usize,
    /// Entries left untouched because the pass stopped early.
    pub unattempted: usize,
    /// Entries in the backlog after the pass.
    pub remaining: usize,
    /// True if the callback asked to stop before the end.
    pub aborted: bool,
}

/// Bounded, crash-safe FIFO of pending events.
///
/// Holds an exclusive advisory lock for its whole lifetime; mutation goes
/// through `&mut self`, so there is exactly one logical writer.
pub struct Backlog {
    /// Path to the backlog file.
    path: PathBuf,
    max_entries: usize,
    /// Number of decodable entries on disk.
    count: usize,
    /// Held for the lifetime of the handle.
    _lock: File,
}

impl Backlog {
    /// Open (or create) the backlog at `path`.
    ///
    /// Fails with [`BacklogError::Locked`] if another handle already owns it.
    pub fn open(path: &Path, max_entries: usize) -> BacklogResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let lock = acquire_lock(&lock_path(path)).map_err(|e| {
            if e.kind() == fs2::lock_contended_error().kind() {
                BacklogError::Locked {
                    path: path.to_path_buf(),
                }
            } else {
                BacklogError::Io(e)
            }
        })?;

        OpenOptions::new().create(true).append(true).open(path)?;

        let mut backlog = Backlog {
            path: path.to_path_buf(),
            max_entries: max_entries.max(1),
            count: 0,
            _lock: lock,
        };

        backlog.repair_torn_tail()?;

        let entries = backlog.read_all()?;
        backlog.count = entries.len();

        if backlog.count > backlog.max_entries {
            let excess = backlog.count - backlog.max_entries;
            warn!(
                evicted = excess,
                max = backlog.max_entries,
                "backlog over capacity at open, dropping oldest entries"
            );
            backlog.rewrite(&entries[excess..])?;
        }

        Ok(backlog)
    }

    /// Path of the backlog file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured capacity.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Number of pending entries.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Check if the backlog is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Size of the backlog file in bytes.
    pub fn size_bytes(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// Append one event.
    ///
    /// When the backlog is full the single oldest entry is dropped first.
    /// That is data loss and is logged as such; capture never blocks on
    /// storage pressure.
    pub fn append(&mut self, event: &AttendanceEvent) -> BacklogResult<AppendReport> {
        let line = record::encode(event)?;

        if self.count >= self.max_entries {
            let mut entries = self.read_all()?;
            let overflow = (entries.len() + 1).saturating_sub(self.max_entries);
            let evicted: Vec<AttendanceEvent> = entries.drain(..overflow).collect();
            entries.push(event.clone());
            self.rewrite(&entries)?;

            for lost in &evicted {
                warn!(
                    tag = %lost.tag_id,
                    timestamp = %lost.timestamp,
                    max = self.max_entries,
                    "backlog full, evicted oldest entry"
                );
            }
            return Ok(AppendReport {
                evicted: evicted.into_iter().next(),
            });
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        if !ends_with_newline(&mut file)? {
            self.repair_torn_tail()?;
        }
        let prev_len = file.metadata()?.len();

        let mut buf = line.into_bytes();
        buf.push(b'\n');
        if let Err(e) = file.write_all(&buf).and_then(|()| file.sync_all()) {
            // Drop the partial record so the next append starts on a fresh line.
            if let Err(trunc) = file.set_len(prev_len) {
                warn!(error = %trunc, path = %self.path.display(), "failed to roll back partial append");
            }
            return Err(e.into());
        }

        self.count += 1;
        debug!(tag = %event.tag_id, depth = self.count, "appended to backlog");
        Ok(AppendReport::default())
    }

    /// Read all pending entries in FIFO order without removing them.
    ///
    /// Lines that fail to decode are skipped with a warning.
    pub fn read_all(&self) -> BacklogResult<Vec<AttendanceEvent>> {
        read_entries(&self.path)
    }

    /// Offer every entry, oldest first, to `deliver` and keep only failures.
    ///
    /// `deliver` returns `Continue(outcome)` to move on or `Break(outcome)` to
    /// record that outcome and stop; entries after a break are kept without
    /// being attempted. `Delivered` and `RejectedPermanently` entries are
    /// removed, `Failed` ones stay in their original order.
    ///
    /// The file is replaced in one atomic rename, and only if at least one
    /// entry settled, so an all-failure pass leaves it byte-for-byte intact.
    pub async fn drain_attempt<F, Fut>(&mut self, mut deliver: F) -> BacklogResult<DrainReport>
    where
        F: FnMut(AttendanceEvent) -> Fut,
        Fut: Future<Output = ControlFlow<DeliveryOutcome, DeliveryOutcome>>,
    {
        let entries = self.read_all()?;
        let total = entries.len();
        let mut report = DrainReport::default();
        let mut retained = Vec::with_capacity(total);

        for event in entries {
            if report.aborted {
                report.unattempted += 1;
                retained.push(event);
                continue;
            }

            let (outcome, stop) = match deliver(event.clone()).await {
                ControlFlow::Continue(outcome) => (outcome, false),
                ControlFlow::Break(outcome) => (outcome, true),
            };

            match outcome {
                DeliveryOutcome::Delivered => report.delivered += 1,
                DeliveryOutcome::RejectedPermanently => report.rejected += 1,
                DeliveryOutcome::Failed => {
                    report.failed += 1;
                    retained.push(event);
                }
            }
            report.aborted = stop;
        }

        if retained.len() < total {
            self.rewrite(&retained)?;
        } else {
            self.count = total;
        }

        report.remaining = retained.len();
        Ok(report)
    }

    /// Remove every entry.
    pub fn clear(&mut self) -> BacklogResult<()> {
        self.rewrite(&[])
    }

    /// Atomically replace the file content with `entries`.
    fn rewrite(&mut self, entries: &[AttendanceEvent]) -> BacklogResult<()> {
        let tmp_path = sibling_path(&self.path, ".tmp");

        let mut buf = Vec::new();
        for event in entries {
            buf.extend_from_slice(record::encode(event)?.as_bytes());
            buf.push(b'\n');
        }

        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&buf)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        sync_parent_dir(&self.path);

        self.count = entries.len();
        Ok(())
    }

    /// Truncate a trailing partial line left by an interrupted append.
    fn repair_torn_tail(&mut self) -> BacklogResult<()> {
        let bytes = fs::read(&self.path)?;
        if matches!(bytes.last(), None | Some(b'\n')) {
            return Ok(());
        }

        let keep = bytes
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |pos| pos + 1);
        warn!(
            discarded_bytes = bytes.len() - keep,
            path = %self.path.display(),
            "discarding torn trailing backlog record"
        );

        let file = OpenOptions::new().write(true).open(&self.path)?;
        file.set_len(keep as u64)?;
        file.sync_all()?;
        Ok(())
    }
}

/// Depth and size of a backlog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct BacklogStats {
    pub entries: usize,
    pub bytes: u64,
}

/// Read-only look at a backlog without taking the lock.
///
/// Safe next to a running owner: appends are single writes and rewrites
/// are atomic renames, so this sees either the old or the new content.
pub fn inspect(path: &Path) -> BacklogResult<BacklogStats> {
    let entries = read_entries(path)?.len();
    let bytes = match fs::metadata(path) {
        Ok(m) => m.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
        Err(e) => return Err(e.into()),
    };
    Ok(BacklogStats { entries, bytes })
}

fn read_entries(path: &Path) -> BacklogResult<Vec<AttendanceEvent>> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    for (index, raw) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = String::from_utf8_lossy(raw);
        if line.trim().is_empty() {
            continue;
        }
        match record::decode(&line) {
            Ok(event) => entries.push(event),
            Err(e) => warn!(line = index + 1, error = %e, "skipping malformed backlog line"),
        }
    }

    Ok(entries)
}

/// True if `file` is empty or its last byte is a newline.
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Lock a sibling file: a rewrite replaces the data file's inode.
fn lock_path(path: &Path) -> PathBuf {
    sibling_path(path, ".lock")
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn acquire_lock(lock_path: &Path) -> std::io::Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive()?;
    Ok(file)
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
            warn!(error = %e, dir = %parent.display(), "failed to sync backlog directory");
        }
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}

#[cfg(test)]
#[path = "backlog_tests.rs"]
mod tests;
