// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::MockBackend;

fn monitor_over(backend: &Arc<MockBackend>) -> (ConnectivityMonitor, mpsc::Receiver<ProbeEvent>) {
    let backend: Arc<dyn Backend> = Arc::clone(backend) as Arc<dyn Backend>;
    ConnectivityMonitor::new(
        backend,
        Arc::new(SharedConnectivity::new()),
        Duration::from_millis(100),
    )
}

#[test]
fn shared_state_starts_offline() {
    let state = SharedConnectivity::new();
    assert_eq!(state.get(), ConnectivityState::Offline);
    assert!(!state.is_online());
}

#[test]
fn transition_reports_edges_only() {
    let state = SharedConnectivity::new();

    assert!(!state.transition(ConnectivityState::Offline));
    assert!(state.transition(ConnectivityState::Online));
    assert!(!state.transition(ConnectivityState::Online));
    assert!(state.is_online());
    assert!(state.transition(ConnectivityState::Offline));
    assert_eq!(state.get(), ConnectivityState::Offline);
}

#[test]
fn apply_is_edge_triggered() {
    let backend = Arc::new(MockBackend::new());
    let (monitor, _rx) = monitor_over(&backend);

    assert_eq!(monitor.apply(&ProbeEvent::Reachable), Transition::WentOnline);
    assert_eq!(monitor.apply(&ProbeEvent::Reachable), Transition::Unchanged);

    let failed = ProbeEvent::Unreachable { error: "refused".into() };
    assert_eq!(monitor.apply(&failed), Transition::WentOffline);
    assert_eq!(monitor.apply(&failed), Transition::Unchanged);
}

#[test]
fn delivery_failure_goes_offline() {
    let backend = Arc::new(MockBackend::new());
    let (monitor, _rx) = monitor_over(&backend);
    monitor.apply(&ProbeEvent::Reachable);

    assert_eq!(monitor.report_failure("HTTP 503"), Transition::WentOffline);
    assert!(!monitor.is_online());
}

#[test]
fn shared_handle_sees_monitor_writes() {
    let backend = Arc::new(MockBackend::new());
    let (monitor, _rx) = monitor_over(&backend);
    let observer = monitor.shared();

    monitor.apply(&ProbeEvent::Reachable);
    assert!(observer.is_online());
}

#[tokio::test]
async fn probe_now_follows_backend() {
    let backend = Arc::new(MockBackend::new());
    let (monitor, _rx) = monitor_over(&backend);

    assert_eq!(monitor.probe_now().await, Transition::WentOnline);

    backend.set_reachable(false);
    assert_eq!(monitor.probe_now().await, Transition::WentOffline);
    assert_eq!(backend.probe_count(), 2);
}

#[tokio::test]
async fn spawned_probe_reports_through_channel() {
    let backend = Arc::new(MockBackend::new());
    let (monitor, mut rx) = monitor_over(&backend);

    assert!(monitor.spawn_probe());
    let event = rx.recv().await.unwrap();
    assert_eq!(event, ProbeEvent::Reachable);

    // Reporting does not change state until the loop applies it.
    assert!(!monitor.is_online());
    assert_eq!(monitor.apply(&event), Transition::WentOnline);
}

#[tokio::test]
async fn spawned_probe_reports_failure() {
    let backend = Arc::new(MockBackend::new());
    backend.set_reachable(false);
    let (monitor, mut rx) = monitor_over(&backend);

    monitor.spawn_probe();
    let event = rx.recv().await.unwrap();
    assert!(matches!(event, ProbeEvent::Unreachable { .. }));
}

#[tokio::test]
async fn only_one_probe_in_flight() {
    let backend = Arc::new(MockBackend::new());
    let (monitor, mut rx) = monitor_over(&backend);

    assert!(monitor.spawn_probe());
    assert!(!monitor.spawn_probe());

    rx.recv().await.unwrap();
    assert!(!monitor.probe_in_flight());
    assert!(monitor.spawn_probe());
    rx.recv().await.unwrap();
    assert_eq!(backend.probe_count(), 2);
}

#[tokio::test]
async fn cancelled_monitor_sends_nothing() {
    let backend = Arc::new(MockBackend::new());
    let (monitor, mut rx) = monitor_over(&backend);

    monitor.cancel();
    monitor.spawn_probe();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(monitor.cancel_token().is_cancelled());
    assert!(rx.try_recv().is_err());
}
