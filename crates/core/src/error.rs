// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for rc-core operations.

use thiserror::Error;

/// All possible errors that can occur in rc-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: &'static str },

    #[error("invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: &'static str },

    #[error("malformed backlog record: {0}")]
    MalformedRecord(String),

    #[error("unsupported backlog record version {0}")]
    UnsupportedRecordVersion(u32),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true for errors raised at the validation boundary, before an
    /// event ever enters the pipeline.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidTag { .. } | Error::InvalidUrl { .. })
    }
}

/// A specialized Result type for rc-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
