// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Attendance events and delivery outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clock::Clock;
use crate::tag::TagId;

/// A captured tag read intended for delivery to the backend.
///
/// Serializes to the backend's request body shape
/// (`{"rfidTag", "timestamp", "deviceId"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    #[serde(rename = "rfidTag")]
    pub tag_id: TagId,
    pub timestamp: String,
    #[serde(rename = "deviceId")]
    pub device_id: String,
}

impl AttendanceEvent {
    pub fn new(tag_id: TagId, timestamp: impl Into<String>, device_id: impl Into<String>) -> Self {
        AttendanceEvent {
            tag_id,
            timestamp: timestamp.into(),
            device_id: device_id.into(),
        }
    }

    /// Builds an event stamped with the clock's current wall time.
    pub fn capture(tag_id: TagId, clock: &impl Clock, device_id: &str) -> Self {
        AttendanceEvent::new(tag_id, clock.timestamp(), device_id)
    }
}

impl fmt::Display for AttendanceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.tag_id, self.timestamp)
    }
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The backend accepted the event.
    Delivered,
    /// The backend refused the event as invalid or duplicate; never retried.
    RejectedPermanently,
    /// Transient failure (network, timeout, server error); kept for retry.
    Failed,
}

impl DeliveryOutcome {
    /// Classifies an HTTP status code returned by the delivery endpoint.
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => DeliveryOutcome::Delivered,
            400..=499 => DeliveryOutcome::RejectedPermanently,
            _ => DeliveryOutcome::Failed,
        }
    }

    /// Returns true if the event should leave the backlog.
    pub fn is_settled(self) -> bool {
        !matches!(self, DeliveryOutcome::Failed)
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryOutcome::Delivered => write!(f, "delivered"),
            DeliveryOutcome::RejectedPermanently => write!(f, "rejected"),
            DeliveryOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Reachability of the backend as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    Online,
    #[default]
    Offline,
}

impl ConnectivityState {
    pub fn is_online(self) -> bool {
        self == ConnectivityState::Online
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectivityState::Online => write!(f, "online"),
            ConnectivityState::Offline => write!(f, "offline"),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
