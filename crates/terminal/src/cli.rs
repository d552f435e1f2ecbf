// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "rollcall")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first attendance terminal")]
#[command(
    long_about = "Offline-first attendance terminal.\n\n\
    Reads tag IDs, reports attendance to the backend, and keeps a durable \
    backlog while the backend is unreachable."
)]
pub struct Cli {
    /// Data directory (backlog, config, log)
    #[arg(long, global = true, value_name = "path")]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: <data-dir>/config.toml)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the terminal, reading tag IDs from stdin ("sync" drains now)
    Run,

    /// Show backlog depth and resolved configuration
    Status {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Probe the backend and drain the backlog once
    Drain,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
