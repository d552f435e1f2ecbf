// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backend abstraction for the attendance server.
//!
//! Provides a trait-based client layer that enables:
//! - Real HTTP delivery for production
//! - Scripted in-memory backends for unit testing
//!
//! Every call takes an explicit deadline. A call that does not finish in
//! time resolves to [`BackendError::Timeout`] and is never left in flight.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rc_core::{AttendanceEvent, DeliveryOutcome};
use reqwest::RequestBuilder;
use tracing::{debug, warn};

use crate::heartbeat::HeartbeatPayload;

/// Path of the delivery endpoint.
pub const ATTENDANCE_PATH: &str = "/attendance";
/// Path of the reachability probe.
pub const HEALTH_PATH: &str = "/health";
/// Path of the liveness endpoint.
pub const HEARTBEAT_PATH: &str = "/devices/heartbeat";

/// Error type for backend calls.
///
/// All variants are transient from the pipeline's point of view. A
/// backend-confirmed rejection is not an error, it is
/// [`DeliveryOutcome::RejectedPermanently`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Deadline elapsed before a response arrived.
    #[error("request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// Could not reach the server at all.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Server answered with a status that is neither success nor rejection.
    #[error("server returned HTTP {status}")]
    Server { status: u16 },

    /// Request could not be built or sent.
    #[error("request failed: {0}")]
    Request(String),
}

impl BackendError {
    /// True if the failure means the backend is not reachable, as opposed
    /// to reachable but unhappy.
    pub fn is_network(&self) -> bool {
        matches!(self, BackendError::Timeout { .. } | BackendError::Connect(_))
    }
}

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Boxed future returned by [`Backend`] methods.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = BackendResult<T>> + Send + 'a>>;

/// Client for the attendance server.
///
/// This trait abstracts over the actual transport, allowing for easy testing
/// with mock implementations.
pub trait Backend: Send + Sync {
    /// Submit one event.
    ///
    /// Returns `Delivered` on success and `RejectedPermanently` on a 4xx
    /// answer. Anything else is an error.
    fn deliver<'a>(
        &'a self,
        event: &'a AttendanceEvent,
        timeout: Duration,
    ) -> BackendFuture<'a, DeliveryOutcome>;

    /// Reachability probe. `Ok` only if the health endpoint answered 200.
    fn probe(&self, timeout: Duration) -> BackendFuture<'_, ()>;

    /// Send a liveness signal.
    fn heartbeat<'a>(
        &'a self,
        payload: &'a HeartbeatPayload,
        timeout: Duration,
    ) -> BackendFuture<'a, ()>;
}

/// HTTP backend implementation using reqwest.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: &str) -> BackendResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("rollcall/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpBackend {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Backend for HttpBackend {
    fn deliver<'a>(
        &'a self,
        event: &'a AttendanceEvent,
        timeout: Duration,
    ) -> BackendFuture<'a, DeliveryOutcome> {
        Box::pin(async move {
            let request = self.client.post(self.endpoint(ATTENDANCE_PATH)).json(event);
            let status = send_with_deadline(request, timeout).await?;

            match DeliveryOutcome::from_status(status) {
                DeliveryOutcome::Failed => {
                    warn!(tag = %event.tag_id, status, "server error on delivery");
                    Err(BackendError::Server { status })
                }
                DeliveryOutcome::RejectedPermanently => {
                    warn!(tag = %event.tag_id, status, "delivery rejected by server");
                    Ok(DeliveryOutcome::RejectedPermanently)
                }
                DeliveryOutcome::Delivered => {
                    debug!(tag = %event.tag_id, status, "delivered");
                    Ok(DeliveryOutcome::Delivered)
                }
            }
        })
    }

    fn probe(&self, timeout: Duration) -> BackendFuture<'_, ()> {
        Box::pin(async move {
            let request = self.client.get(self.endpoint(HEALTH_PATH));
            match send_with_deadline(request, timeout).await? {
                200 => Ok(()),
                status => Err(BackendError::Server { status }),
            }
        })
    }

    fn heartbeat<'a>(
        &'a self,
        payload: &'a HeartbeatPayload,
        timeout: Duration,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let request = self.client.post(self.endpoint(HEARTBEAT_PATH)).json(payload);
            match send_with_deadline(request, timeout).await? {
                200..=299 => Ok(()),
                status => Err(BackendError::Server { status }),
            }
        })
    }
}

/// Send `request` and return the status code, bounded by `timeout`.
///
/// The deadline is set on the request and also enforced around the whole
/// future, so connection setup counts against it too.
async fn send_with_deadline(request: RequestBuilder, timeout: Duration) -> BackendResult<u16> {
    let after_ms = timeout.as_millis() as u64;
    match tokio::time::timeout(timeout, request.timeout(timeout).send()).await {
        Err(_) => Err(BackendError::Timeout { after_ms }),
        Ok(Err(e)) => Err(classify(e, after_ms)),
        Ok(Ok(response)) => Ok(response.status().as_u16()),
    }
}

fn classify(e: reqwest::Error, after_ms: u64) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout { after_ms }
    } else if e.is_connect() {
        BackendError::Connect(e.to_string())
    } else {
        BackendError::Request(e.to_string())
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
