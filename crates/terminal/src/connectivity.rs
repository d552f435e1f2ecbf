// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline tracking for the backend.
//!
//! [`SharedConnectivity`] is the single process-wide connectivity flag. It is
//! readable from anywhere through an `Arc`, but only [`ConnectivityMonitor`]
//! can change it, and every change is edge-triggered and logged.
//!
//! Reachability probes run on a spawned task and report back through a
//! channel, so the dispatch loop keeps capturing tags with the last known
//! state while a probe is in flight.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rc_core::ConnectivityState;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::Backend;

/// Connectivity values for the atomic state field.
pub const STATE_OFFLINE: u8 = 0;
pub const STATE_ONLINE: u8 = 1;

/// Connectivity state visible to every component.
///
/// Uses an atomic field for lock-free reads. Starts `Offline`.
#[derive(Debug)]
pub struct SharedConnectivity {
    state: AtomicU8,
}

impl SharedConnectivity {
    /// Create a new shared state initialized to offline.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_OFFLINE),
        }
    }

    /// Get the current state.
    pub fn get(&self) -> ConnectivityState {
        match self.state.load(Ordering::Acquire) {
            STATE_ONLINE => ConnectivityState::Online,
            _ => ConnectivityState::Offline,
        }
    }

    /// Check if currently online.
    pub fn is_online(&self) -> bool {
        self.get().is_online()
    }

    /// Store `to` and return whether the value changed.
    fn transition(&self, to: ConnectivityState) -> bool {
        let (from, to) = match to {
            ConnectivityState::Online => (STATE_OFFLINE, STATE_ONLINE),
            ConnectivityState::Offline => (STATE_ONLINE, STATE_OFFLINE),
        };
        self.state
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for SharedConnectivity {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a background probe, sent to the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    /// Health endpoint answered 200.
    Reachable,
    /// Probe failed.
    Unreachable {
        /// Error message.
        error: String,
    },
}

/// Whether applying an observation changed the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentOnline,
    WentOffline,
    Unchanged,
}

/// Owns every write to [`SharedConnectivity`] and runs reachability probes.
pub struct ConnectivityMonitor {
    backend: Arc<dyn Backend>,
    shared: Arc<SharedConnectivity>,
    probe_timeout: Duration,
    /// Sender for probe results.
    event_tx: mpsc::Sender<ProbeEvent>,
    /// Set while a spawned probe has not reported back.
    in_flight: Arc<AtomicBool>,
    /// Cancellation token for graceful shutdown.
    cancel_token: CancellationToken,
}

impl ConnectivityMonitor {
    /// Create a new monitor.
    ///
    /// Returns the monitor and a receiver for probe results.
    pub fn new(
        backend: Arc<dyn Backend>,
        shared: Arc<SharedConnectivity>,
        probe_timeout: Duration,
    ) -> (Self, mpsc::Receiver<ProbeEvent>) {
        let (event_tx, event_rx) = mpsc::channel(4);

        let monitor = Self {
            backend,
            shared,
            probe_timeout,
            event_tx,
            in_flight: Arc::new(AtomicBool::new(false)),
            cancel_token: CancellationToken::new(),
        };

        (monitor, event_rx)
    }

    /// Last committed state.
    pub fn state(&self) -> ConnectivityState {
        self.shared.get()
    }

    /// Check if currently online.
    pub fn is_online(&self) -> bool {
        self.shared.is_online()
    }

    /// Shared handle for read-only observers.
    pub fn shared(&self) -> Arc<SharedConnectivity> {
        Arc::clone(&self.shared)
    }

    /// True while a spawned probe has not reported back.
    pub fn probe_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start a background probe.
    ///
    /// Returns false without spawning if one is already in flight. The
    /// result arrives on the receiver returned by [`ConnectivityMonitor::new`]
    /// and must be passed to [`ConnectivityMonitor::apply`].
    pub fn spawn_probe(&self) -> bool {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("probe already in flight");
            return false;
        }

        let backend = Arc::clone(&self.backend);
        let in_flight = Arc::clone(&self.in_flight);
        let event_tx = self.event_tx.clone();
        let cancel_token = self.cancel_token.clone();
        let timeout = self.probe_timeout;

        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = cancel_token.cancelled() => None,
                result = backend.probe(timeout) => Some(result),
            };
            in_flight.store(false, Ordering::Release);

            let event = match result {
                None => return,
                Some(Ok(())) => ProbeEvent::Reachable,
                Some(Err(e)) => ProbeEvent::Unreachable {
                    error: e.to_string(),
                },
            };
            let _ = event_tx.send(event).await;
        });
        true
    }

    /// Probe inline and apply the result.
    pub async fn probe_now(&self) -> Transition {
        let event = match self.backend.probe(self.probe_timeout).await {
            Ok(()) => ProbeEvent::Reachable,
            Err(e) => ProbeEvent::Unreachable {
                error: e.to_string(),
            },
        };
        self.apply(&event)
    }

    /// Commit the result of a probe.
    pub fn apply(&self, event: &ProbeEvent) -> Transition {
        match event {
            ProbeEvent::Reachable => self.mark_online(),
            ProbeEvent::Unreachable { error } => self.mark_offline(&format!("probe failed: {error}")),
        }
    }

    /// Record a failed delivery. Any failure takes the terminal offline.
    pub fn report_failure(&self, reason: &str) -> Transition {
        self.mark_offline(reason)
    }

    /// Cancel any pending probe.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Get a cancellation token for this monitor.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    fn mark_online(&self) -> Transition {
        if self.shared.transition(ConnectivityState::Online) {
            info!(from = "offline", to = "online", "backend reachable");
            Transition::WentOnline
        } else {
            Transition::Unchanged
        }
    }

    fn mark_offline(&self, reason: &str) -> Transition {
        if self.shared.transition(ConnectivityState::Offline) {
            warn!(from = "online", to = "offline", reason, "backend unreachable");
            Transition::WentOffline
        } else {
            debug!(reason, "still offline");
            Transition::Unchanged
        }
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
