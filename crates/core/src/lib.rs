// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rc-core: shared primitives for the rollcall attendance terminal.
//!
//! This crate holds the I/O-free pieces of the event pipeline: tag
//! validation, the attendance event model, the backlog line codec, the
//! debounce gate and the clock abstraction.

pub mod clock;
pub mod dedup;
pub mod error;
pub mod event;
pub mod record;
pub mod tag;
pub mod url;

pub use clock::{Clock, SystemClock, UNSYNCED_TIMESTAMP};
pub use dedup::{DedupGate, DedupWindow};
pub use error::{Error, Result};
pub use event::{AttendanceEvent, ConnectivityState, DeliveryOutcome};
pub use tag::TagId;
pub use url::validate_backend_url;
