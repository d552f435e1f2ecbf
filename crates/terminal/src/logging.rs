// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup.
//!
//! `RUST_LOG` always wins. Otherwise the long-running terminal logs at info
//! to its log file, and the one-shot commands only print warnings to stderr.

use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// With `log_path`, lines are appended to that file; if it cannot be
/// opened, logging falls back to stderr.
pub fn setup_logging(log_path: Option<&Path>, verbose: bool) {
    let level = match (verbose, log_path.is_some()) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(file) = log_path.and_then(open_log_file) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

fn open_log_file(path: &Path) -> Option<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).ok()?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok()
}
