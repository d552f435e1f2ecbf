// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `rollcall drain`: one manual drain, then exit.

use super::{open_terminal, runtime};
use crate::config::Config;
use crate::error::Result;
use crate::sync::SyncReport;
use crate::Paths;

pub fn run(paths: &Paths) -> Result<()> {
    let rt = runtime()?;
    let report = rt.block_on(async {
        let config = Config::load(&paths.config);
        let mut terminal = open_terminal(paths, config)?;
        terminal.drain_once().await
    })?;
    println!("{}", summary(&report));
    Ok(())
}

pub(crate) fn summary(report: &SyncReport) -> String {
    let mut line = format!(
        "drained: {} delivered, {} rejected, {} failed, {} remaining",
        report.delivered, report.rejected, report.failed, report.remaining
    );
    if report.aborted {
        line.push_str(" (stopped early)");
    }
    line
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
