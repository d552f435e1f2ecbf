// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

fn sample() -> AttendanceEvent {
    AttendanceEvent::new(TagId::parse("ABCD1234").unwrap(), "2025-09-01T08:30:00", "RC_01")
}

#[test]
fn encode_is_single_line_with_version() {
    let line = encode(&sample()).unwrap();
    assert!(!line.contains('\n'));
    assert!(line.starts_with("{\"v\":1,"));
    assert_eq!(
        line,
        r#"{"v":1,"tag":"ABCD1234","ts":"2025-09-01T08:30:00","device":"RC_01"}"#
    );
}

#[test]
fn decode_reads_encoded_line() {
    let line = encode(&sample()).unwrap();
    assert_eq!(decode(&line).unwrap(), sample());
}

#[test]
fn decode_tolerates_surrounding_whitespace() {
    let line = format!("  {}\r", encode(&sample()).unwrap());
    assert_eq!(decode(&line).unwrap(), sample());
}

#[parameterized(
    empty = { "" },
    blank = { "   " },
    torn = { r#"{"v":1,"tag":"ABCD1234","ts":"2025-09"# },
    not_json = { "ABCD1234,2025-09-01T08:30:00" },
    missing_version = { r#"{"tag":"ABCD1234","ts":"x","device":"d"}"# },
    missing_field = { r#"{"v":1,"tag":"ABCD1234","ts":"x"}"# },
    invalid_tag = { r#"{"v":1,"tag":"zz","ts":"x","device":"d"}"# },
)]
fn decode_rejects_malformed(line: &str) {
    let err = decode(line).unwrap_err();
    assert!(matches!(err, Error::MalformedRecord(_)), "got {err:?}");
}

#[test]
fn decode_rejects_unknown_version() {
    let err = decode(r#"{"v":2,"tag":"ABCD1234","ts":"x","device":"d"}"#).unwrap_err();
    assert!(matches!(err, Error::UnsupportedRecordVersion(2)));
}
