// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Validated identity tag IDs.
//!
//! Tags arrive from the reader as loosely formatted hex strings. A [`TagId`]
//! can only be constructed through [`TagId::parse`], which normalizes to
//! uppercase and enforces the length and alphabet rules, so everything
//! downstream of the validation boundary can assume a well-formed tag.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Minimum tag length in hex characters.
pub const MIN_TAG_LEN: usize = 8;
/// Maximum tag length in hex characters.
pub const MAX_TAG_LEN: usize = 20;

/// A normalized, uppercase hexadecimal tag identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagId(String);

impl TagId {
    /// Normalizes and validates a raw tag read.
    ///
    /// Surrounding whitespace is trimmed, colon or space separators between
    /// byte pairs are removed, and lowercase hex is uppercased.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| *c != ':' && *c != ' ')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if normalized.len() < MIN_TAG_LEN {
            return Err(Error::InvalidTag { tag: raw.to_string(), reason: "too short" });
        }
        if normalized.len() > MAX_TAG_LEN {
            return Err(Error::InvalidTag { tag: raw.to_string(), reason: "too long" });
        }
        if !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidTag {
                tag: raw.to_string(),
                reason: "not hexadecimal",
            });
        }

        Ok(TagId(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TagId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TagId::parse(s)
    }
}

impl TryFrom<String> for TagId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        TagId::parse(&value)
    }
}

impl From<TagId> for String {
    fn from(tag: TagId) -> Self {
        tag.0
    }
}

impl AsRef<str> for TagId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "tag_tests.rs"]
mod tests;
