// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `rollcall run`: the long-running terminal.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{open_terminal, runtime};
use crate::config::Config;
use crate::error::Result;
use crate::input;
use crate::Paths;

const INPUT_CHANNEL_CAPACITY: usize = 64;

/// A blocked stdin read can hold a runtime thread; don't wait on it at exit.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

pub fn run(paths: &Paths) -> Result<()> {
    let rt = runtime()?;
    let result = rt.block_on(run_async(paths));
    rt.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

async fn run_async(paths: &Paths) -> Result<()> {
    let mut config = Config::load(&paths.config);
    if !paths.config.exists() {
        config.save(&paths.config)?;
        info!(path = %paths.config.display(), "wrote default config");
    }

    let mut terminal = open_terminal(paths, config)?;

    let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
    let reader = input::spawn_stdin(input_tx);

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, shutting down");
                on_signal.cancel();
            }
            Err(e) => warn!(error = %e, "failed to listen for interrupt"),
        }
    });

    terminal.run(input_rx, shutdown).await;
    reader.abort();
    Ok(())
}
