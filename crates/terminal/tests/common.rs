// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// A port nothing listens on.
pub const DEAD_BACKEND: &str = "http://127.0.0.1:9";

pub fn rollcall() -> Command {
    let mut cmd = cargo_bin_cmd!("rollcall");
    cmd.env_remove("RUST_LOG")
        .env_remove("ROLLCALL_STATE_DIR")
        .env_remove("XDG_STATE_HOME");
    cmd
}

/// `rollcall` pointed at `dir` as its data directory.
pub fn rollcall_in(dir: &TempDir) -> Command {
    let mut cmd = rollcall();
    cmd.arg("--data-dir").arg(dir.path());
    cmd
}

pub fn backlog_path(dir: &TempDir) -> PathBuf {
    dir.path().join("backlog.jsonl")
}

pub fn write_config(dir: &TempDir, backend_url: &str) {
    let content = format!(
        "backend_url = \"{backend_url}\"\n\
         device_id = \"RC_IT\"\n\
         http_timeout_ms = 1000\n\
         probe_timeout_ms = 500\n\
         retry_count = 0\n"
    );
    fs::write(dir.path().join("config.toml"), content).unwrap();
}

/// Write backlog records for `tags`, oldest first.
pub fn seed_backlog(dir: &TempDir, tags: &[&str]) {
    let lines: String = tags
        .iter()
        .enumerate()
        .map(|(i, tag)| {
            format!(
                "{{\"v\":1,\"tag\":\"{tag}\",\"ts\":\"2026-03-01T08:00:{i:02}\",\"device\":\"RC_IT\"}}\n"
            )
        })
        .collect();
    fs::write(backlog_path(dir), lines).unwrap();
}

/// Tags left in the backlog, in file order.
pub fn backlog_tags(dir: &TempDir) -> Vec<String> {
    let Ok(content) = fs::read_to_string(backlog_path(dir)) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            let v: serde_json::Value = serde_json::from_str(l).unwrap();
            v["tag"].as_str().unwrap().to_string()
        })
        .collect()
}
