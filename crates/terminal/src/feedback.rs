// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User feedback hooks.
//!
//! The pipeline reports every capture decision as a [`FeedbackSignal`]. A
//! buzzer or display driver implements [`Feedback`]; the default
//! [`LogFeedback`] only writes log lines.

use std::fmt;

use tracing::{debug, error, info, warn};

/// What the person at the reader should be told.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackSignal {
    /// Delivered to the backend.
    Accepted,
    /// Stored locally for later delivery.
    QueuedOffline,
    /// Backend refused the event (unknown or inactive user).
    Rejected,
    /// Repeat read inside the debounce window.
    Duplicate,
    /// Tag failed validation.
    InvalidTag,
    /// Event could not be stored.
    StorageFailure,
}

impl fmt::Display for FeedbackSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeedbackSignal::Accepted => "accepted",
            FeedbackSignal::QueuedOffline => "queued_offline",
            FeedbackSignal::Rejected => "rejected",
            FeedbackSignal::Duplicate => "duplicate",
            FeedbackSignal::InvalidTag => "invalid_tag",
            FeedbackSignal::StorageFailure => "storage_failure",
        };
        write!(f, "{s}")
    }
}

/// Sink for user feedback signals. Must not block.
pub trait Feedback: Send + Sync {
    fn signal(&self, signal: FeedbackSignal);
}

/// Feedback that logs each signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl Feedback for LogFeedback {
    fn signal(&self, signal: FeedbackSignal) {
        match signal {
            FeedbackSignal::Accepted | FeedbackSignal::QueuedOffline => {
                info!(%signal, "feedback")
            }
            FeedbackSignal::Duplicate => debug!(%signal, "feedback"),
            FeedbackSignal::Rejected | FeedbackSignal::InvalidTag => warn!(%signal, "feedback"),
            FeedbackSignal::StorageFailure => error!(%signal, "feedback"),
        }
    }
}
