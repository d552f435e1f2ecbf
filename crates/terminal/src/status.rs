// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only counters for the display layer.
//!
//! Nothing here gates correctness: the pipeline updates the board after the
//! fact and the UI only reads [`StatusBoard::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use rc_core::ConnectivityState;
use serde::{Deserialize, Serialize};

use crate::backlog::Backlog;
use crate::connectivity::SharedConnectivity;
use crate::sync::SyncReport;

/// Lock-free counters shared with observers.
#[derive(Debug)]
pub struct StatusBoard {
    connectivity: Arc<SharedConnectivity>,
    backlog_depth: AtomicU64,
    backlog_bytes: AtomicU64,
    delivered: AtomicU64,
    queued: AtomicU64,
    rejected: AtomicU64,
    evicted: AtomicU64,
    lost: AtomicU64,
    duplicates: AtomicU64,
    invalid_tags: AtomicU64,
    heartbeats_sent: AtomicU64,
    heartbeats_failed: AtomicU64,
    last_sync: Mutex<Option<SyncReport>>,
}

/// Point-in-time copy of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub connectivity: ConnectivityState,
    pub backlog_depth: u64,
    pub backlog_bytes: u64,
    pub delivered: u64,
    pub queued: u64,
    pub rejected: u64,
    /// Oldest entries dropped at capacity.
    pub evicted: u64,
    /// Events dropped because the backlog could not be written.
    pub lost: u64,
    pub duplicates: u64,
    pub invalid_tags: u64,
    pub heartbeats_sent: u64,
    pub heartbeats_failed: u64,
    pub last_sync: Option<SyncReport>,
}

impl StatusBoard {
    pub fn new(connectivity: Arc<SharedConnectivity>) -> Self {
        StatusBoard {
            connectivity,
            backlog_depth: AtomicU64::new(0),
            backlog_bytes: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            queued: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
            lost: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            invalid_tags: AtomicU64::new(0),
            heartbeats_sent: AtomicU64::new(0),
            heartbeats_failed: AtomicU64::new(0),
            last_sync: Mutex::new(None),
        }
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.connectivity.get()
    }

    /// Refresh depth and size from the backlog handle.
    pub fn record_backlog(&self, backlog: &Backlog) {
        self.backlog_depth
            .store(backlog.count() as u64, Ordering::Relaxed);
        self.backlog_bytes
            .store(backlog.size_bytes(), Ordering::Relaxed);
    }

    pub fn record_delivered(&self, n: usize) {
        self.delivered.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn record_rejected(&self, n: usize) {
        self.rejected.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn record_queued(&self) {
        self.queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evicted(&self) {
        self.evicted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lost(&self) {
        self.lost.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_tag(&self) {
        self.invalid_tags.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_heartbeat(&self, sent: bool) {
        let counter = if sent {
            &self.heartbeats_sent
        } else {
            &self.heartbeats_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Store the result of a drain pass and add its deliveries to the totals.
    pub fn record_sync(&self, report: &SyncReport) {
        self.record_delivered(report.delivered);
        self.record_rejected(report.rejected);
        let mut last = self.last_sync.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(report.clone());
    }

    pub fn last_sync(&self) -> Option<SyncReport> {
        self.last_sync
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            connectivity: self.connectivity(),
            backlog_depth: self.backlog_depth.load(Ordering::Relaxed),
            backlog_bytes: self.backlog_bytes.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            lost: self.lost.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            invalid_tags: self.invalid_tags.load(Ordering::Relaxed),
            heartbeats_sent: self.heartbeats_sent.load(Ordering::Relaxed),
            heartbeats_failed: self.heartbeats_failed.load(Ordering::Relaxed),
            last_sync: self.last_sync(),
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
