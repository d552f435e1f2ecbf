// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic liveness signal.
//!
//! Heartbeats are fire-and-forget: a failure is logged and counted, and has
//! no effect on capture, routing, the backlog or connectivity.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rc_core::ConnectivityState;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::backlog::Backlog;
use crate::status::StatusBoard;

/// Reported as `firmwareVersion`.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Operational summary sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatPayload {
    pub device_id: String,
    pub firmware_version: String,
    pub uptime_secs: u64,
    pub backlog_depth: usize,
    /// Free space on the backlog's filesystem, if it could be read.
    pub free_storage_bytes: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatOutcome {
    Sent,
    SkippedOffline,
    Failed,
}

pub struct HeartbeatScheduler {
    backend: Arc<dyn Backend>,
    device_id: String,
    timeout: Duration,
    status: Arc<StatusBoard>,
}

impl HeartbeatScheduler {
    pub fn new(
        backend: Arc<dyn Backend>,
        device_id: impl Into<String>,
        timeout: Duration,
        status: Arc<StatusBoard>,
    ) -> Self {
        HeartbeatScheduler {
            backend,
            device_id: device_id.into(),
            timeout,
            status,
        }
    }

    pub fn payload(&self, uptime_secs: u64, backlog: &Backlog) -> HeartbeatPayload {
        HeartbeatPayload {
            device_id: self.device_id.clone(),
            firmware_version: FIRMWARE_VERSION.to_string(),
            uptime_secs,
            backlog_depth: backlog.count(),
            free_storage_bytes: free_storage(backlog.path()),
        }
    }

    /// Send one heartbeat if online.
    pub async fn beat(
        &self,
        uptime_secs: u64,
        backlog: &Backlog,
        connectivity: ConnectivityState,
    ) -> HeartbeatOutcome {
        if !connectivity.is_online() {
            debug!("skipping heartbeat while offline");
            return HeartbeatOutcome::SkippedOffline;
        }

        let payload = self.payload(uptime_secs, backlog);
        match self.backend.heartbeat(&payload, self.timeout).await {
            Ok(()) => {
                debug!(uptime_secs, depth = payload.backlog_depth, "heartbeat sent");
                self.status.record_heartbeat(true);
                HeartbeatOutcome::Sent
            }
            Err(e) => {
                warn!(error = %e, "heartbeat failed");
                self.status.record_heartbeat(false);
                HeartbeatOutcome::Failed
            }
        }
    }
}

fn free_storage(backlog_path: &Path) -> Option<u64> {
    let dir = backlog_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs2::available_space(dir).ok()
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
