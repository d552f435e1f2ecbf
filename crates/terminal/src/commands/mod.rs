// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod drain;
pub mod run;
pub mod status;

use std::sync::Arc;

use rc_core::SystemClock;

use crate::backend::HttpBackend;
use crate::backlog::Backlog;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::feedback::LogFeedback;
use crate::terminal::Terminal;
use crate::Paths;

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))
}

/// Open the backlog and wire a terminal against the HTTP backend.
///
/// Fails if another process holds the backlog.
fn open_terminal(paths: &Paths, config: Config) -> Result<Terminal> {
    let backlog = Backlog::open(&paths.backlog, config.max_backlog_entries)?;
    let backend = Arc::new(HttpBackend::new(&config.backend_url)?);
    Ok(Terminal::new(
        config,
        backend,
        backlog,
        Arc::new(SystemClock::new()),
        Arc::new(LogFeedback),
    ))
}
