// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Host input adapter.
//!
//! Stands in for the tag reader on a general-purpose host: every
//! non-empty line on stdin is a raw tag read, and the line `sync` requests
//! a manual drain.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Command for the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Raw, unvalidated tag read.
    Tag(String),
    /// Drain the backlog now.
    SyncNow,
}

/// Keyword that triggers a manual drain.
pub const SYNC_COMMAND: &str = "sync";

/// Interpret one input line. Blank lines yield nothing.
pub fn parse_line(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        None
    } else if line.eq_ignore_ascii_case(SYNC_COMMAND) {
        Some(Input::SyncNow)
    } else {
        Some(Input::Tag(line.to_string()))
    }
}

/// Forward parsed lines from `reader` until EOF or the receiver goes away.
pub async fn forward_lines<R>(reader: R, tx: mpsc::Sender<Input>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(input) = parse_line(&line) else {
                    continue;
                };
                if tx.send(input).await.is_err() {
                    debug!("input receiver closed");
                    return;
                }
            }
            Ok(None) => {
                debug!("input reached EOF");
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to read input");
                return;
            }
        }
    }
}

/// Spawn a task that feeds stdin into `tx`.
pub fn spawn_stdin(tx: mpsc::Sender<Input>) -> JoinHandle<()> {
    tokio::spawn(forward_lines(BufReader::new(tokio::io::stdin()), tx))
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
