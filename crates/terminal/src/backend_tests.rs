// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the HTTP backend against a local mock server.

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::make_event;
use serde_json::json;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};
use yare::parameterized;

const TIMEOUT: Duration = Duration::from_secs(2);

async fn deliver_with_status(status: u16) -> BackendResult<DeliveryOutcome> {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path(ATTENDANCE_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri()).unwrap();
    backend.deliver(&make_event(1), TIMEOUT).await
}

#[parameterized(
    ok = { 200 },
    created = { 201 },
)]
fn success_is_delivered(status: u16) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let result = rt.block_on(deliver_with_status(status));
    assert_eq!(result, Ok(DeliveryOutcome::Delivered));
}

#[parameterized(
    bad_request = { 400 },
    inactive_user = { 403 },
    unknown_user = { 404 },
    duplicate = { 409 },
)]
fn client_error_is_permanent_rejection(status: u16) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let result = rt.block_on(deliver_with_status(status));
    assert_eq!(result, Ok(DeliveryOutcome::RejectedPermanently));
}

#[parameterized(
    internal = { 500 },
    unavailable = { 503 },
)]
fn server_error_is_transient(status: u16) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let err = rt.block_on(deliver_with_status(status)).unwrap_err();
    assert_eq!(err, BackendError::Server { status });
    assert!(!err.is_network());
}

#[tokio::test]
async fn deliver_posts_event_json() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/attendance"))
        .and(matchers::body_json(json!({
            "rfidTag": "00000001",
            "timestamp": "2026-03-01T08:00:01",
            "deviceId": "RC_TEST",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri()).unwrap();
    let outcome = backend.deliver(&make_event(1), TIMEOUT).await.unwrap();
    assert_eq!(outcome, DeliveryOutcome::Delivered);
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&format!("{}/", server.uri())).unwrap();
    assert_eq!(backend.base_url(), server.uri());
    assert!(backend.probe(TIMEOUT).await.is_ok());
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri()).unwrap();
    let err = backend
        .deliver(&make_event(1), Duration::from_millis(100))
        .await
        .unwrap_err();

    assert_eq!(err, BackendError::Timeout { after_ms: 100 });
    assert!(err.is_network());
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    // Mock servers are pooled and keep listening after drop, so free a
    // port by hand instead.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let backend = HttpBackend::new(&format!("http://127.0.0.1:{port}")).unwrap();
    let err = backend.probe(TIMEOUT).await.unwrap_err();
    assert!(matches!(err, BackendError::Connect(_)), "unexpected error: {err}");
    assert!(err.is_network());
}

#[tokio::test]
async fn probe_requires_200() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/health"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri()).unwrap();
    let err = backend.probe(TIMEOUT).await.unwrap_err();
    assert_eq!(err, BackendError::Server { status: 204 });
}

#[tokio::test]
async fn heartbeat_posts_camel_case_summary() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/devices/heartbeat"))
        .and(matchers::body_partial_json(json!({
            "deviceId": "RC_TEST",
            "uptimeSecs": 42,
            "backlogDepth": 3,
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let payload = HeartbeatPayload {
        device_id: "RC_TEST".into(),
        firmware_version: "0.1.0".into(),
        uptime_secs: 42,
        backlog_depth: 3,
        free_storage_bytes: Some(1024),
    };
    let backend = HttpBackend::new(&server.uri()).unwrap();
    assert!(backend.heartbeat(&payload, TIMEOUT).await.is_ok());
}

#[test]
fn network_classification() {
    assert!(BackendError::Timeout { after_ms: 1 }.is_network());
    assert!(BackendError::Connect("refused".into()).is_network());
    assert!(!BackendError::Server { status: 502 }.is_network());
    assert!(!BackendError::Request("bad".into()).is_network());
}
