// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::connectivity::SharedConnectivity;
use crate::test_helpers::{make_event, MockBackend, TEST_DEVICE};
use tempfile::tempdir;

fn scheduler(backend: &Arc<MockBackend>) -> (HeartbeatScheduler, Arc<StatusBoard>) {
    let status = Arc::new(StatusBoard::new(Arc::new(SharedConnectivity::new())));
    let scheduler = HeartbeatScheduler::new(
        Arc::clone(backend) as Arc<dyn Backend>,
        TEST_DEVICE,
        Duration::from_millis(100),
        Arc::clone(&status),
    );
    (scheduler, status)
}

#[tokio::test]
async fn sends_summary_when_online() {
    let dir = tempdir().unwrap();
    let mut backlog = Backlog::open(&dir.path().join("backlog.jsonl"), 10).unwrap();
    backlog.append(&make_event(1)).unwrap();
    backlog.append(&make_event(2)).unwrap();

    let backend = Arc::new(MockBackend::new());
    let (scheduler, status) = scheduler(&backend);

    let outcome = scheduler
        .beat(90, &backlog, ConnectivityState::Online)
        .await;

    assert_eq!(outcome, HeartbeatOutcome::Sent);
    let sent = backend.heartbeats();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].device_id, TEST_DEVICE);
    assert_eq!(sent[0].uptime_secs, 90);
    assert_eq!(sent[0].backlog_depth, 2);
    assert_eq!(sent[0].firmware_version, FIRMWARE_VERSION);
    assert!(sent[0].free_storage_bytes.is_some());
    assert_eq!(status.snapshot().heartbeats_sent, 1);
}

#[tokio::test]
async fn skipped_while_offline() {
    let dir = tempdir().unwrap();
    let backlog = Backlog::open(&dir.path().join("backlog.jsonl"), 10).unwrap();
    let backend = Arc::new(MockBackend::new());
    let (scheduler, _status) = scheduler(&backend);

    let outcome = scheduler
        .beat(1, &backlog, ConnectivityState::Offline)
        .await;

    assert_eq!(outcome, HeartbeatOutcome::SkippedOffline);
    assert!(backend.heartbeats().is_empty());
}

#[tokio::test]
async fn failure_is_counted_not_raised() {
    let dir = tempdir().unwrap();
    let backlog = Backlog::open(&dir.path().join("backlog.jsonl"), 10).unwrap();
    let backend = Arc::new(MockBackend::new());
    backend.set_heartbeat_fails(true);
    let (scheduler, status) = scheduler(&backend);

    let outcome = scheduler
        .beat(1, &backlog, ConnectivityState::Online)
        .await;

    assert_eq!(outcome, HeartbeatOutcome::Failed);
    assert_eq!(status.snapshot().heartbeats_failed, 1);
}

#[test]
fn payload_uses_camel_case_keys() {
    let payload = HeartbeatPayload {
        device_id: TEST_DEVICE.into(),
        firmware_version: "1.0.0".into(),
        uptime_secs: 5,
        backlog_depth: 0,
        free_storage_bytes: None,
    };
    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["deviceId"], TEST_DEVICE);
    assert_eq!(json["firmwareVersion"], "1.0.0");
    assert_eq!(json["uptimeSecs"], 5);
    assert_eq!(json["backlogDepth"], 0);
    assert!(json["freeStorageBytes"].is_null());
}
