// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backlog drain.
//!
//! A drain offers every queued event to the backend in capture order and
//! keeps only the ones that failed. It runs on reconnect, on a retry timer,
//! when the loop has been idle, and on demand.
//!
//! The pass only starts while online. After every delivery it re-reads the
//! connectivity state, and a network-level failure (timeout, refused
//! connection) stops it, leaving the rest of the backlog untouched for the
//! next pass. A 5xx answer only fails that one entry.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use rc_core::DeliveryOutcome;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::backend::Backend;
use crate::backlog::Backlog;
use crate::connectivity::ConnectivityMonitor;
use crate::status::StatusBoard;

/// What started a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    /// Connectivity went from offline to online.
    Reconnect,
    /// Periodic retry timer.
    Timer,
    /// Explicit request.
    Manual,
    /// No input for a while.
    Idle,
}

impl fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncTrigger::Reconnect => "reconnect",
            SyncTrigger::Timer => "timer",
            SyncTrigger::Manual => "manual",
            SyncTrigger::Idle => "idle",
        };
        write!(f, "{s}")
    }
}

/// Result of one drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub trigger: SyncTrigger,
    pub delivered: usize,
    pub rejected: usize,
    pub failed: usize,
    /// Entries still queued afterwards.
    pub remaining: usize,
    /// Stopped early on a network failure or a storage error.
    pub aborted: bool,
    /// Not attempted because the terminal was offline.
    pub skipped: bool,
    /// Monotonic tick at which the pass ended.
    pub finished_at_ms: u64,
}

impl SyncReport {
    fn skipped(trigger: SyncTrigger, remaining: usize, now_ms: u64) -> Self {
        SyncReport {
            trigger,
            delivered: 0,
            rejected: 0,
            failed: 0,
            remaining,
            aborted: false,
            skipped: true,
            finished_at_ms: now_ms,
        }
    }
}

/// Drains the backlog through the backend.
pub struct SyncEngine {
    backend: Arc<dyn Backend>,
    /// Deadline for each delivery.
    timeout: Duration,
    status: Arc<StatusBoard>,
}

impl SyncEngine {
    pub fn new(backend: Arc<dyn Backend>, timeout: Duration, status: Arc<StatusBoard>) -> Self {
        SyncEngine {
            backend,
            timeout,
            status,
        }
    }

    /// Drain the backlog once.
    ///
    /// Returns with `skipped` set, and without touching the backlog, if the
    /// terminal is offline.
    pub async fn drain(
        &self,
        trigger: SyncTrigger,
        backlog: &mut Backlog,
        monitor: &ConnectivityMonitor,
        now_ms: u64,
    ) -> SyncReport {
        if !monitor.is_online() {
            debug!(%trigger, depth = backlog.count(), "offline, skipping drain");
            return SyncReport::skipped(trigger, backlog.count(), now_ms);
        }

        let total = backlog.count();
        if total == 0 {
            debug!(%trigger, "backlog empty, nothing to drain");
        }

        let backend = &self.backend;
        let timeout = self.timeout;
        let mut attempted = 0usize;

        let result = backlog
            .drain_attempt(|event| {
                attempted += 1;
                let position = attempted;
                async move {
                    let outcome = match backend.deliver(&event, timeout).await {
                        Ok(outcome) => outcome,
                        Err(e) if e.is_network() => {
                            warn!(tag = %event.tag_id, error = %e, "backend lost during drain, stopping");
                            monitor.report_failure(&e.to_string());
                            return ControlFlow::Break(DeliveryOutcome::Failed);
                        }
                        Err(e) => {
                            warn!(tag = %event.tag_id, error = %e, "delivery failed, keeping entry");
                            DeliveryOutcome::Failed
                        }
                    };

                    // Display only; the denominator is the depth before the pass.
                    debug!(
                        tag = %event.tag_id,
                        %outcome,
                        progress = position * 100 / total.max(1),
                        "drain progress"
                    );

                    if monitor.is_online() {
                        ControlFlow::Continue(outcome)
                    } else {
                        ControlFlow::Break(outcome)
                    }
                }
            })
            .await;

        let report = match result {
            Ok(drained) => SyncReport {
                trigger,
                delivered: drained.delivered,
                rejected: drained.rejected,
                failed: drained.failed,
                remaining: drained.remaining,
                aborted: drained.aborted,
                skipped: false,
                finished_at_ms: now_ms,
            },
            Err(e) => {
                error!(%trigger, error = %e, "failed to rewrite backlog after drain");
                SyncReport {
                    trigger,
                    delivered: 0,
                    rejected: 0,
                    failed: 0,
                    remaining: backlog.count(),
                    aborted: true,
                    skipped: false,
                    finished_at_ms: now_ms,
                }
            }
        };

        if total > 0 {
            info!(
                %trigger,
                delivered = report.delivered,
                rejected = report.rejected,
                failed = report.failed,
                remaining = report.remaining,
                aborted = report.aborted,
                "drain complete"
            );
        }

        self.status.record_sync(&report);
        self.status.record_backlog(backlog);
        report
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
