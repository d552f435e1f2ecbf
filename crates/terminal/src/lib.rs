// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rollcall - an offline-first attendance terminal.
//!
//! Tag reads come in on stdin, are validated and debounced, and are sent to
//! the attendance backend. While the backend is unreachable, events go to a
//! durable on-disk backlog that is drained on reconnect, on a timer, after
//! an idle spell, or on demand.
//!
//! # Main Components
//!
//! - [`Terminal`] - context object that owns the pipeline and runs the loop
//! - [`Backlog`] - bounded append-only JSON Lines queue with an exclusive lock
//! - [`Backend`] - the HTTP seam, implemented by [`HttpBackend`]
//! - [`ConnectivityMonitor`] - the only writer of the online/offline flag
//! - [`Config`] - `config.toml` with per-key fallback to defaults

mod cli;
mod commands;
mod env;
mod logging;

pub mod backend;
pub mod backlog;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod feedback;
pub mod heartbeat;
pub mod input;
pub mod router;
pub mod status;
pub mod sync;
pub mod terminal;

#[cfg(test)]
mod test_helpers;

use std::path::{Path, PathBuf};

pub use backend::{Backend, BackendError, HttpBackend};
pub use backlog::{Backlog, BacklogError, BacklogStats};
pub use cli::{Cli, Command, OutputFormat};
pub use config::Config;
pub use connectivity::{ConnectivityMonitor, SharedConnectivity};
pub use error::{Error, Result};
pub use feedback::{Feedback, FeedbackSignal, LogFeedback};
pub use status::{StatusBoard, StatusSnapshot};
pub use sync::{SyncReport, SyncTrigger};
pub use terminal::{Capture, Terminal};

/// Files the terminal reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Paths {
    pub data_dir: PathBuf,
    pub config: PathBuf,
    pub backlog: PathBuf,
    pub log: PathBuf,
}

impl Paths {
    fn resolve(data_dir: Option<&Path>, config: Option<&Path>) -> Self {
        let data_dir = data_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(config::default_data_dir);
        Paths {
            config: config
                .map(Path::to_path_buf)
                .unwrap_or_else(|| config::config_path(&data_dir)),
            backlog: config::backlog_path(&data_dir),
            log: config::log_path(&data_dir),
            data_dir,
        }
    }
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let paths = Paths::resolve(cli.data_dir.as_deref(), cli.config.as_deref());
    match cli.command {
        Command::Run => {
            logging::setup_logging(Some(&paths.log), cli.verbose);
            commands::run::run(&paths)
        }
        Command::Status { output } => {
            logging::setup_logging(None, cli.verbose);
            commands::status::run(&paths, output)
        }
        Command::Drain => {
            logging::setup_logging(None, cli.verbose);
            commands::drain::run(&paths)
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
