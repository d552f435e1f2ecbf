// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The terminal context and its dispatch loop.
//!
//! [`Terminal`] owns every pipeline component. There is no global state:
//! connectivity, the backlog and the counters are fields here, and each
//! step borrows what it needs.
//!
//! The loop runs one step at a time. A capture, a drain and a heartbeat
//! never interleave, which is what makes the backlog single-writer; the only
//! concurrent work is the reachability probe, whose result comes back
//! through a channel and is applied by the loop itself.

use std::sync::Arc;
use std::time::Duration;

use rc_core::{AttendanceEvent, Clock, DedupGate, DeliveryOutcome, TagId};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::backlog::Backlog;
use crate::config::Config;
use crate::connectivity::{ConnectivityMonitor, ProbeEvent, SharedConnectivity, Transition};
use crate::error::{Error, Result};
use crate::feedback::{Feedback, FeedbackSignal};
use crate::heartbeat::{HeartbeatOutcome, HeartbeatScheduler};
use crate::input::Input;
use crate::router::{DeliveryRouter, RouterConfig};
use crate::status::StatusBoard;
use crate::sync::{SyncEngine, SyncReport, SyncTrigger};

/// What happened to one raw read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Validated, deduplicated and routed.
    Routed(DeliveryOutcome),
    /// Dropped by the debounce gate.
    Duplicate,
    /// Failed validation.
    Invalid,
}

/// Explicit context object for the event pipeline.
pub struct Terminal {
    config: Config,
    clock: Arc<dyn Clock>,
    dedup: DedupGate,
    backlog: Backlog,
    monitor: ConnectivityMonitor,
    probe_rx: mpsc::Receiver<ProbeEvent>,
    router: DeliveryRouter,
    sync: SyncEngine,
    heartbeat: HeartbeatScheduler,
    status: Arc<StatusBoard>,
    feedback: Arc<dyn Feedback>,
}

impl Terminal {
    /// Wire the pipeline together. Connectivity starts offline.
    pub fn new(
        config: Config,
        backend: Arc<dyn Backend>,
        backlog: Backlog,
        clock: Arc<dyn Clock>,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        let shared = Arc::new(SharedConnectivity::new());
        let status = Arc::new(StatusBoard::new(Arc::clone(&shared)));
        status.record_backlog(&backlog);

        let (monitor, probe_rx) =
            ConnectivityMonitor::new(Arc::clone(&backend), shared, config.probe_timeout());
        let router = DeliveryRouter::new(
            Arc::clone(&backend),
            RouterConfig {
                timeout: config.http_timeout(),
                retry_count: config.retry_count,
            },
            Arc::clone(&status),
            Arc::clone(&feedback),
        );
        let sync = SyncEngine::new(
            Arc::clone(&backend),
            config.http_timeout(),
            Arc::clone(&status),
        );
        let heartbeat = HeartbeatScheduler::new(
            backend,
            config.device_id.clone(),
            config.http_timeout(),
            Arc::clone(&status),
        );

        Terminal {
            dedup: DedupGate::new(config.debounce()),
            config,
            clock,
            backlog,
            monitor,
            probe_rx,
            router,
            sync,
            heartbeat,
            status,
            feedback,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Counters for observers.
    pub fn status(&self) -> Arc<StatusBoard> {
        Arc::clone(&self.status)
    }

    pub fn backlog(&self) -> &Backlog {
        &self.backlog
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    /// Validate, deduplicate and route one raw read.
    pub async fn capture(&mut self, raw: &str) -> Capture {
        let tag = match TagId::parse(raw) {
            Ok(tag) => tag,
            Err(e) => {
                warn!(error = %e, "rejected tag read");
                self.status.record_invalid_tag();
                self.feedback.signal(FeedbackSignal::InvalidTag);
                return Capture::Invalid;
            }
        };

        if !self.dedup.accept(&tag, self.clock.tick_ms()) {
            debug!(tag = %tag, "duplicate read suppressed");
            self.status.record_duplicate();
            self.feedback.signal(FeedbackSignal::Duplicate);
            return Capture::Duplicate;
        }

        let event = AttendanceEvent::capture(tag, &self.clock, &self.config.device_id);
        let outcome = self
            .router
            .route(&event, &mut self.backlog, &self.monitor)
            .await;
        Capture::Routed(outcome)
    }

    /// Drain the backlog now, if online.
    pub async fn sync_now(&mut self, trigger: SyncTrigger) -> SyncReport {
        let now_ms = self.clock.tick_ms();
        self.sync
            .drain(trigger, &mut self.backlog, &self.monitor, now_ms)
            .await
    }

    /// Probe inline and drain if that brought the terminal online.
    pub async fn probe_now(&mut self) -> Option<SyncReport> {
        let transition = self.monitor.probe_now().await;
        self.after_transition(transition).await
    }

    /// Apply a probe result from the background task.
    pub async fn handle_probe(&mut self, event: ProbeEvent) -> Option<SyncReport> {
        let transition = self.monitor.apply(&event);
        self.after_transition(transition).await
    }

    async fn after_transition(&mut self, transition: Transition) -> Option<SyncReport> {
        if transition == Transition::WentOnline {
            Some(self.sync_now(SyncTrigger::Reconnect).await)
        } else {
            None
        }
    }

    /// Probe, then drain once as a manual trigger.
    ///
    /// Fails with [`Error::Unreachable`] if the probe does not bring the
    /// terminal online.
    pub async fn drain_once(&mut self) -> Result<SyncReport> {
        self.monitor.probe_now().await;
        if !self.monitor.is_online() {
            return Err(Error::Unreachable {
                url: self.config.backend_url.clone(),
            });
        }
        Ok(self.sync_now(SyncTrigger::Manual).await)
    }

    /// Send a heartbeat if online.
    pub async fn heartbeat(&self) -> HeartbeatOutcome {
        let uptime_secs = self.clock.tick_ms() / 1000;
        self.heartbeat
            .beat(uptime_secs, &self.backlog, self.monitor.state())
            .await
    }

    /// Run the dispatch loop until `shutdown` is cancelled.
    ///
    /// A closed input channel does not stop the loop; the terminal keeps
    /// probing and draining without a reader.
    pub async fn run(&mut self, mut inputs: mpsc::Receiver<Input>, shutdown: CancellationToken) {
        let now = Instant::now();
        let mut probe_tick = tokio::time::interval(self.config.probe_interval());
        probe_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sync_tick = interval_at(
            deadline(now, self.config.sync_retry_interval()),
            self.config.sync_retry_interval(),
        );
        sync_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut heartbeat_tick = interval_at(
            deadline(now, self.config.heartbeat_interval()),
            self.config.heartbeat_interval(),
        );
        heartbeat_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let idle = tokio::time::sleep_until(deadline(now, self.config.idle_sync()));
        tokio::pin!(idle);
        let mut inputs_open = true;

        info!(
            device_id = %self.config.device_id,
            backend = %self.config.backend_url,
            depth = self.backlog.count(),
            "terminal started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                input = inputs.recv(), if inputs_open => {
                    match input {
                        Some(Input::Tag(raw)) => {
                            self.capture(&raw).await;
                        }
                        Some(Input::SyncNow) => {
                            self.sync_now(SyncTrigger::Manual).await;
                        }
                        None => {
                            info!("input closed");
                            inputs_open = false;
                        }
                    }
                    idle.as_mut().reset(deadline(Instant::now(), self.config.idle_sync()));
                }
                Some(event) = self.probe_rx.recv() => {
                    self.handle_probe(event).await;
                }
                _ = probe_tick.tick() => {
                    self.monitor.spawn_probe();
                }
                _ = sync_tick.tick() => {
                    self.sync_now(SyncTrigger::Timer).await;
                }
                _ = heartbeat_tick.tick() => {
                    self.heartbeat().await;
                }
                _ = &mut idle => {
                    if !self.backlog.is_empty() {
                        self.sync_now(SyncTrigger::Idle).await;
                    }
                    idle.as_mut().reset(deadline(Instant::now(), self.config.idle_sync()));
                }
            }
        }

        self.monitor.cancel();
        info!(depth = self.backlog.count(), "terminal stopped");
    }
}

/// Timers never need to reach further than this.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365);

/// `from + after`, saturating at [`FAR_FUTURE`] instead of overflowing.
fn deadline(from: Instant, after: Duration) -> Instant {
    from.checked_add(after.min(FAR_FUTURE))
        .or_else(|| from.checked_add(FAR_FUTURE))
        .unwrap_or(from)
}

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;
