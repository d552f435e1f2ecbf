// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Line-record codec for the durable backlog.
//!
//! Each backlog entry is one JSON object on its own line:
//!
//! ```text
//! {"v":1,"tag":"ABCD1234","ts":"2025-09-01T08:30:00","device":"RC_01"}
//! ```
//!
//! The `v` field is mandatory and checked before the rest of the record is
//! interpreted. Decoding never panics: a torn or foreign line surfaces as
//! [`Error::MalformedRecord`] or [`Error::UnsupportedRecordVersion`] and the
//! caller decides to skip it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::AttendanceEvent;
use crate::tag::TagId;

/// Current record layout version.
pub const RECORD_VERSION: u32 = 1;

#[derive(Deserialize)]
struct Header {
    v: u32,
}

#[derive(Serialize, Deserialize)]
struct RecordV1 {
    v: u32,
    tag: TagId,
    ts: String,
    device: String,
}

/// Encodes an event as a single line (without the trailing newline).
pub fn encode(event: &AttendanceEvent) -> Result<String> {
    let record = RecordV1 {
        v: RECORD_VERSION,
        tag: event.tag_id.clone(),
        ts: event.timestamp.clone(),
        device: event.device_id.clone(),
    };
    Ok(serde_json::to_string(&record)?)
}

/// Decodes one line produced by [`encode`].
pub fn decode(line: &str) -> Result<AttendanceEvent> {
    let line = line.trim();
    if line.is_empty() {
        return Err(Error::MalformedRecord("empty line".to_string()));
    }

    let header: Header =
        serde_json::from_str(line).map_err(|e| Error::MalformedRecord(e.to_string()))?;
    if header.v != RECORD_VERSION {
        return Err(Error::UnsupportedRecordVersion(header.v));
    }

    let record: RecordV1 =
        serde_json::from_str(line).map_err(|e| Error::MalformedRecord(e.to_string()))?;
    Ok(AttendanceEvent::new(record.tag, record.ts, record.device))
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
