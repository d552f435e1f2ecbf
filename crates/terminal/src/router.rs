// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Live-or-queue decision for each captured event.

use std::sync::Arc;
use std::time::Duration;

use rc_core::{AttendanceEvent, DeliveryOutcome};
use tracing::{debug, error, info, warn};

use crate::backend::{Backend, BackendError};
use crate::backlog::Backlog;
use crate::connectivity::ConnectivityMonitor;
use crate::feedback::{Feedback, FeedbackSignal};
use crate::status::StatusBoard;

/// Timeout and retry budget for live delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Deadline for each attempt.
    pub timeout: Duration,
    /// Extra attempts after the first, for transient failures only.
    pub retry_count: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(10_000),
            retry_count: 3,
        }
    }
}

/// Routes captured events to the backend or the backlog.
///
/// Online, an event is delivered live with a bounded retry budget and falls
/// back to the backlog if every attempt fails. Offline, it goes straight to
/// the backlog without touching the network.
pub struct DeliveryRouter {
    backend: Arc<dyn Backend>,
    config: RouterConfig,
    status: Arc<StatusBoard>,
    feedback: Arc<dyn Feedback>,
}

impl DeliveryRouter {
    pub fn new(
        backend: Arc<dyn Backend>,
        config: RouterConfig,
        status: Arc<StatusBoard>,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        DeliveryRouter {
            backend,
            config,
            status,
            feedback,
        }
    }

    pub fn config(&self) -> RouterConfig {
        self.config
    }

    /// Route one event.
    ///
    /// `Failed` means the event was not delivered now: it is in the backlog,
    /// or was lost if the backlog could not be written.
    pub async fn route(
        &self,
        event: &AttendanceEvent,
        backlog: &mut Backlog,
        monitor: &ConnectivityMonitor,
    ) -> DeliveryOutcome {
        if monitor.is_online() {
            match self.deliver_with_retry(event).await {
                Ok(DeliveryOutcome::Delivered) => {
                    info!(tag = %event.tag_id, timestamp = %event.timestamp, "event delivered");
                    self.status.record_delivered(1);
                    self.feedback.signal(FeedbackSignal::Accepted);
                    return DeliveryOutcome::Delivered;
                }
                Ok(DeliveryOutcome::RejectedPermanently) => {
                    warn!(tag = %event.tag_id, "event rejected by backend, dropping");
                    self.status.record_rejected(1);
                    self.feedback.signal(FeedbackSignal::Rejected);
                    return DeliveryOutcome::RejectedPermanently;
                }
                Ok(DeliveryOutcome::Failed) => {
                    monitor.report_failure("delivery failed");
                }
                Err(e) => {
                    warn!(tag = %event.tag_id, error = %e, "live delivery failed, queueing");
                    monitor.report_failure(&e.to_string());
                }
            }
        } else {
            debug!(tag = %event.tag_id, "offline, skipping live delivery");
        }

        self.enqueue(event, backlog);
        DeliveryOutcome::Failed
    }

    /// Attempt delivery up to `1 + retry_count` times.
    ///
    /// Only transient errors are retried; a rejection returns immediately.
    async fn deliver_with_retry(
        &self,
        event: &AttendanceEvent,
    ) -> Result<DeliveryOutcome, BackendError> {
        let attempts = self.config.retry_count.saturating_add(1);
        let mut attempt = 1;
        loop {
            match self.backend.deliver(event, self.config.timeout).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if attempt < attempts => {
                    debug!(tag = %event.tag_id, attempt, error = %e, "delivery attempt failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn enqueue(&self, event: &AttendanceEvent, backlog: &mut Backlog) {
        match backlog.append(event) {
            Ok(report) => {
                if report.evicted.is_some() {
                    self.status.record_evicted();
                }
                info!(tag = %event.tag_id, depth = backlog.count(), "event queued offline");
                self.status.record_queued();
                self.feedback.signal(FeedbackSignal::QueuedOffline);
            }
            Err(e) => {
                error!(tag = %event.tag_id, timestamp = %event.timestamp, error = %e, "failed to store event, event lost");
                self.status.record_lost();
                self.feedback.signal(FeedbackSignal::StorageFailure);
            }
        }
        self.status.record_backlog(backlog);
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
