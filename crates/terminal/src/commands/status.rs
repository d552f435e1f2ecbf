// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `rollcall status`: local state only, no network.
//!
//! Reads the backlog without locking it, so this works while `run` is up.

use std::path::PathBuf;

use serde::Serialize;

use crate::backlog::{self, BacklogStats};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::Paths;

#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub device_id: String,
    pub backend_url: String,
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    pub config_saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    pub backlog_path: PathBuf,
    pub backlog: BacklogStats,
    pub max_backlog_entries: usize,
}

impl StatusReport {
    pub(crate) fn gather(paths: &Paths) -> Result<Self> {
        let config = Config::load(&paths.config);
        let backlog = backlog::inspect(&paths.backlog)?;
        Ok(StatusReport {
            device_id: config.device_id,
            backend_url: config.backend_url,
            data_dir: paths.data_dir.clone(),
            config_path: paths.config.clone(),
            config_saved: paths.config.exists(),
            last_update: config.last_update,
            backlog_path: paths.backlog.clone(),
            backlog,
            max_backlog_entries: config.max_backlog_entries,
        })
    }

    pub(crate) fn to_text(&self) -> String {
        let saved = match (&self.last_update, self.config_saved) {
            (Some(at), true) => format!("saved {at}"),
            (None, true) => "saved".to_string(),
            (_, false) => "not saved, using defaults".to_string(),
        };
        format!(
            "device:   {}\n\
             backend:  {}\n\
             backlog:  {} of {} entries ({} bytes)\n\
             data dir: {}\n\
             config:   {} ({})",
            self.device_id,
            self.backend_url,
            self.backlog.entries,
            self.max_backlog_entries,
            self.backlog.bytes,
            self.data_dir.display(),
            self.config_path.display(),
            saved,
        )
    }
}

pub fn run(paths: &Paths, output: OutputFormat) -> Result<()> {
    let report = StatusReport::gather(paths)?;
    match output {
        OutputFormat::Text => println!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
