// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::backend::BackendError;
use crate::backlog::BacklogError;

/// All possible errors surfaced by the rollcall library.
///
/// Inside the running loop none of these halt the terminal: they are logged
/// and turned into a routing decision or a counter. They only escape from
/// setup code and the one-shot CLI commands.
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(#[from] rc_core::Error),

    #[error("delivery error: {0}")]
    Backend(#[from] BackendError),

    #[error("storage error: {0}")]
    Storage(#[from] BacklogError),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backend unreachable at {url}\n  hint: entries stay queued until the backend responds to /health")]
    Unreachable { url: String },
}

/// A specialized Result type for rollcall operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
