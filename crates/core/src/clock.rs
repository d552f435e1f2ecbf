// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for capture timestamps and debounce ticks.
//!
//! Two time sources are exposed:
//! - wall time, which only exists once the device clock has been synchronized
//! - a monotonic tick count in milliseconds, which is always available
//!
//! Wall time stamps events; ticks drive debouncing and timers so that a
//! clock correction never reopens or extends a debounce window.

use chrono::{Datelike, Local, NaiveDateTime};
use std::time::Instant;

/// Format used for event timestamps (`YYYY-MM-DDTHH:MM:SS`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Timestamp recorded when the wall clock has not been synchronized yet.
pub const UNSYNCED_TIMESTAMP: &str = "0000-00-00T00:00:00";

/// Wall clock readings from before this year are treated as unsynchronized.
const MIN_VALID_YEAR: i32 = 2021;

/// Trait for reading the current time.
///
/// This allows injecting a mock clock for testing.
pub trait Clock: Send + Sync {
    /// Returns the current local wall time, or `None` if the clock has not
    /// been synchronized.
    fn wall_now(&self) -> Option<NaiveDateTime>;

    /// Returns milliseconds on a monotonic counter.
    fn tick_ms(&self) -> u64;

    /// Returns the capture timestamp string for "now".
    fn timestamp(&self) -> String {
        format_timestamp(self.wall_now())
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn wall_now(&self) -> Option<NaiveDateTime> {
        (**self).wall_now()
    }

    fn tick_ms(&self) -> u64 {
        (**self).tick_ms()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn wall_now(&self) -> Option<NaiveDateTime> {
        (**self).wall_now()
    }

    fn tick_ms(&self) -> u64 {
        (**self).tick_ms()
    }
}

/// Formats a wall time reading, substituting the placeholder when absent.
pub fn format_timestamp(wall: Option<NaiveDateTime>) -> String {
    match wall {
        Some(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
        None => UNSYNCED_TIMESTAMP.to_string(),
    }
}

/// Returns true if the wall time reading looks synchronized.
pub fn is_synchronized(wall: &NaiveDateTime) -> bool {
    wall.year() >= MIN_VALID_YEAR
}

/// System clock using the host's local time and `std::time::Instant`.
#[derive(Debug)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { started: Instant::now() }
    }

    /// Seconds since this clock was created.
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn wall_now(&self) -> Option<NaiveDateTime> {
        let now = Local::now().naive_local();
        is_synchronized(&now).then_some(now)
    }

    fn tick_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
