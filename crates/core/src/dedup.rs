// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Single-slot debounce filter for tag reads.
//!
//! Readers report the same tag several times while it sits on the antenna.
//! The gate remembers only the last *accepted* read: a repeat of that tag
//! inside the window is suppressed, while any other tag passes immediately
//! and takes over the slot. Suppressed reads never extend the window.

use std::time::Duration;

use crate::tag::TagId;

/// Default debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2000);

/// Last accepted read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupWindow {
    pub tag_id: TagId,
    pub captured_at_ms: u64,
}

/// Suppresses bursts of identical reads.
#[derive(Debug, Clone)]
pub struct DedupGate {
    window_ms: u64,
    last: Option<DedupWindow>,
}

impl DedupGate {
    pub fn new(window: Duration) -> Self {
        DedupGate {
            window_ms: window.as_millis() as u64,
            last: None,
        }
    }

    /// Returns true if the read should become an event.
    ///
    /// `now_ms` must come from a monotonic tick source.
    pub fn accept(&mut self, tag_id: &TagId, now_ms: u64) -> bool {
        if let Some(last) = &self.last {
            if last.tag_id == *tag_id && now_ms.saturating_sub(last.captured_at_ms) < self.window_ms
            {
                return false;
            }
        }

        self.last = Some(DedupWindow {
            tag_id: tag_id.clone(),
            captured_at_ms: now_ms,
        });
        true
    }

    /// The currently remembered read, if any.
    pub fn last(&self) -> Option<&DedupWindow> {
        self.last.as_ref()
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for DedupGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
#[path = "dedup_tests.rs"]
mod tests;
