// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for pipeline tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use rc_core::{AttendanceEvent, Clock, DeliveryOutcome, TagId};

use crate::backend::{Backend, BackendError, BackendFuture, BackendResult};
use crate::connectivity::{ConnectivityMonitor, ProbeEvent, SharedConnectivity};
use crate::feedback::{Feedback, FeedbackSignal};
use crate::heartbeat::HeartbeatPayload;
use crate::status::StatusBoard;

pub const TEST_DEVICE: &str = "RC_TEST";

/// Event `n` with tag `{n:08X}`.
pub fn make_event(n: u32) -> AttendanceEvent {
    AttendanceEvent::new(
        TagId::parse(&format!("{n:08X}")).unwrap(),
        format!("2026-03-01T08:{:02}:{:02}", (n / 60) % 60, n % 60),
        TEST_DEVICE,
    )
}

/// Tag strings of `events`, in order.
pub fn tags(events: &[AttendanceEvent]) -> Vec<String> {
    events.iter().map(|e| e.tag_id.to_string()).collect()
}

/// Clock with a fixed wall time and a tick counter moved by hand.
#[derive(Debug)]
pub struct ManualClock {
    wall: Option<NaiveDateTime>,
    tick: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        let wall = NaiveDate::from_ymd_opt(2026, 3, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0));
        ManualClock {
            wall,
            tick: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.tick.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn wall_now(&self) -> Option<NaiveDateTime> {
        self.wall
    }

    fn tick_ms(&self) -> u64 {
        self.tick.load(Ordering::SeqCst)
    }
}

/// In-memory backend with scripted answers.
///
/// Delivery answers come from, in order: the one-shot queue, the per-tag
/// table, then the default (`Delivered`).
pub struct MockBackend {
    reachable: AtomicBool,
    script: Mutex<VecDeque<BackendResult<DeliveryOutcome>>>,
    per_tag: Mutex<HashMap<String, BackendResult<DeliveryOutcome>>>,
    default: Mutex<BackendResult<DeliveryOutcome>>,
    attempts: Mutex<Vec<AttendanceEvent>>,
    heartbeats: Mutex<Vec<HeartbeatPayload>>,
    heartbeat_fails: AtomicBool,
    probes: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        MockBackend {
            reachable: AtomicBool::new(true),
            script: Mutex::new(VecDeque::new()),
            per_tag: Mutex::new(HashMap::new()),
            default: Mutex::new(Ok(DeliveryOutcome::Delivered)),
            attempts: Mutex::new(Vec::new()),
            heartbeats: Mutex::new(Vec::new()),
            heartbeat_fails: AtomicBool::new(false),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Answer the next delivery with `result`.
    pub fn push(&self, result: BackendResult<DeliveryOutcome>) {
        self.script.lock().unwrap().push_back(result);
    }

    /// Always answer deliveries of `tag` with `result`.
    pub fn answer_tag(&self, tag: &str, result: BackendResult<DeliveryOutcome>) {
        self.per_tag.lock().unwrap().insert(tag.to_string(), result);
    }

    pub fn set_default(&self, result: BackendResult<DeliveryOutcome>) {
        *self.default.lock().unwrap() = result;
    }

    pub fn set_heartbeat_fails(&self, fails: bool) {
        self.heartbeat_fails.store(fails, Ordering::SeqCst);
    }

    /// Every delivery attempt, in order.
    pub fn attempts(&self) -> Vec<AttendanceEvent> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempted_tags(&self) -> Vec<String> {
        tags(&self.attempts())
    }

    pub fn heartbeats(&self) -> Vec<HeartbeatPayload> {
        self.heartbeats.lock().unwrap().clone()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn answer(&self, event: &AttendanceEvent) -> BackendResult<DeliveryOutcome> {
        self.attempts.lock().unwrap().push(event.clone());
        if let Some(result) = self.script.lock().unwrap().pop_front() {
            return result;
        }
        if let Some(result) = self.per_tag.lock().unwrap().get(event.tag_id.as_str()) {
            return result.clone();
        }
        self.default.lock().unwrap().clone()
    }
}

impl Backend for MockBackend {
    fn deliver<'a>(
        &'a self,
        event: &'a AttendanceEvent,
        _timeout: Duration,
    ) -> BackendFuture<'a, DeliveryOutcome> {
        Box::pin(async move { self.answer(event) })
    }

    fn probe(&self, _timeout: Duration) -> BackendFuture<'_, ()> {
        Box::pin(async move {
            self.probes.fetch_add(1, Ordering::SeqCst);
            if self.reachable.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(BackendError::Connect("mock unreachable".into()))
            }
        })
    }

    fn heartbeat<'a>(
        &'a self,
        payload: &'a HeartbeatPayload,
        _timeout: Duration,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            if self.heartbeat_fails.load(Ordering::SeqCst) {
                return Err(BackendError::Server { status: 503 });
            }
            self.heartbeats.lock().unwrap().push(payload.clone());
            Ok(())
        })
    }
}

/// Feedback sink that remembers every signal.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    signals: Mutex<Vec<FeedbackSignal>>,
}

impl RecordingFeedback {
    pub fn signals(&self) -> Vec<FeedbackSignal> {
        self.signals.lock().unwrap().clone()
    }
}

impl Feedback for RecordingFeedback {
    fn signal(&self, signal: FeedbackSignal) {
        self.signals.lock().unwrap().push(signal);
    }
}

/// Monitor over `backend`, already online.
pub fn online_monitor(backend: &Arc<MockBackend>) -> ConnectivityMonitor {
    let monitor = offline_monitor(backend);
    monitor.apply(&ProbeEvent::Reachable);
    monitor
}

/// Monitor over `backend` in its initial offline state.
pub fn offline_monitor(backend: &Arc<MockBackend>) -> ConnectivityMonitor {
    let backend: Arc<dyn Backend> = Arc::clone(backend) as Arc<dyn Backend>;
    let (monitor, _rx) = ConnectivityMonitor::new(
        backend,
        Arc::new(SharedConnectivity::new()),
        Duration::from_millis(100),
    );
    monitor
}

/// Status board reading the monitor's connectivity.
pub fn status_for(monitor: &ConnectivityMonitor) -> Arc<StatusBoard> {
    Arc::new(StatusBoard::new(monitor.shared()))
}
