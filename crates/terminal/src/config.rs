// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal configuration.
//!
//! Configuration is stored in `<data_dir>/config.toml` and includes:
//! - `backend_url`: base URL of the attendance server
//! - `device_id`: identifier reported with every event
//! - `last_update`: RFC 3339 marker written on every save
//!
//! plus optional tuning keys. Loading never fails: a missing file, a key
//! that does not parse, or a value that fails validation is replaced by its
//! default and logged.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::env;
use crate::error::{Error, Result};

/// Backend used when none is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://192.168.1.10:3000";

const APP_DIR_NAME: &str = "rollcall";
const CONFIG_FILE_NAME: &str = "config.toml";
const BACKLOG_FILE_NAME: &str = "backlog.jsonl";
const LOG_FILE_NAME: &str = "rollcall.log";
const MACHINE_ID_PATH: &str = "/etc/machine-id";
const DEVICE_ID_PREFIX: &str = "RC_";
const MACHINE_ID_CHARS: usize = 12;

/// Upper bounds for tuning keys. Larger values would overflow timer deadlines.
const MAX_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;
const MAX_TIMEOUT_MS: u64 = 10 * 60 * 1000;
const MAX_DEBOUNCE_MS: u64 = 60 * 60 * 1000;
const MAX_RETRY_COUNT: u32 = 10;
const MAX_BACKLOG_ENTRIES: usize = 1_000_000;

/// Terminal configuration stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the attendance server.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Identifier reported as `deviceId`.
    #[serde(default = "default_device_id")]
    pub device_id: String,
    /// When the file was last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    /// Repeat reads of the same tag inside this window are dropped.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_max_backlog_entries")]
    pub max_backlog_entries: usize,
    /// Deadline for each delivery and heartbeat request.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,
    /// Immediate retries after a failed live delivery.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_sync_retry_interval_secs")]
    pub sync_retry_interval_secs: u64,
    /// Drain after this long without input.
    #[serde(default = "default_idle_sync_secs")]
    pub idle_sync_secs: u64,
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_device_id() -> String {
    fs::read_to_string(MACHINE_ID_PATH)
        .ok()
        .and_then(|raw| device_id_from_machine_id(&raw))
        .unwrap_or_else(|| format!("{DEVICE_ID_PREFIX}UNKNOWN"))
}

fn default_debounce_ms() -> u64 {
    2_000
}

fn default_max_backlog_entries() -> usize {
    crate::backlog::DEFAULT_MAX_ENTRIES
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_retry_count() -> u32 {
    3
}

fn default_probe_interval_secs() -> u64 {
    30
}

fn default_probe_timeout_ms() -> u64 {
    5_000
}

fn default_sync_retry_interval_secs() -> u64 {
    600
}

fn default_idle_sync_secs() -> u64 {
    15
}

fn default_heartbeat_interval_secs() -> u64 {
    600
}

/// Derive a device id from the contents of `/etc/machine-id`.
pub fn device_id_from_machine_id(raw: &str) -> Option<String> {
    let id: String = raw
        .trim()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(MACHINE_ID_CHARS)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if id.is_empty() {
        None
    } else {
        Some(format!("{DEVICE_ID_PREFIX}{id}"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend_url: default_backend_url(),
            device_id: default_device_id(),
            last_update: None,
            debounce_ms: default_debounce_ms(),
            max_backlog_entries: default_max_backlog_entries(),
            http_timeout_ms: default_http_timeout_ms(),
            retry_count: default_retry_count(),
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
            sync_retry_interval_secs: default_sync_retry_interval_secs(),
            idle_sync_secs: default_idle_sync_secs(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Parses TOML content, replacing anything unusable with defaults.
    pub fn parse(content: &str) -> Self {
        let config = match toml::from_str::<Config>(content) {
            Ok(config) => config,
            Err(strict) => match toml::from_str::<toml::Table>(content) {
                Ok(table) => {
                    debug!(error = %strict, "config has invalid values, reading keys one by one");
                    Self::from_table(&table)
                }
                Err(e) => {
                    warn!(error = %e, "failed to parse config, using defaults");
                    return Self::default();
                }
            },
        };
        config.sanitized()
    }

    fn from_table(table: &toml::Table) -> Self {
        Config {
            backend_url: read_key(table, "backend_url", default_backend_url),
            device_id: read_key(table, "device_id", default_device_id),
            last_update: read_key(table, "last_update", || None),
            debounce_ms: read_key(table, "debounce_ms", default_debounce_ms),
            max_backlog_entries: read_key(table, "max_backlog_entries", default_max_backlog_entries),
            http_timeout_ms: read_key(table, "http_timeout_ms", default_http_timeout_ms),
            retry_count: read_key(table, "retry_count", default_retry_count),
            probe_interval_secs: read_key(table, "probe_interval_secs", default_probe_interval_secs),
            probe_timeout_ms: read_key(table, "probe_timeout_ms", default_probe_timeout_ms),
            sync_retry_interval_secs: read_key(
                table,
                "sync_retry_interval_secs",
                default_sync_retry_interval_secs,
            ),
            idle_sync_secs: read_key(table, "idle_sync_secs", default_idle_sync_secs),
            heartbeat_interval_secs: read_key(
                table,
                "heartbeat_interval_secs",
                default_heartbeat_interval_secs,
            ),
        }
    }

    /// Replace values that fail validation with their defaults.
    fn sanitized(mut self) -> Self {
        if let Err(e) = rc_core::validate_backend_url(&self.backend_url) {
            warn!(error = %e, "using default backend_url");
            self.backend_url = default_backend_url();
        }

        let device_id = self.device_id.trim();
        if device_id.is_empty() {
            warn!("device_id is empty, using default");
            self.device_id = default_device_id();
        } else if device_id.len() != self.device_id.len() {
            self.device_id = device_id.to_string();
        }

        in_range(&mut self.debounce_ms, "debounce_ms", 0, MAX_DEBOUNCE_MS, default_debounce_ms());
        in_range(
            &mut self.max_backlog_entries,
            "max_backlog_entries",
            1,
            MAX_BACKLOG_ENTRIES,
            default_max_backlog_entries(),
        );
        in_range(&mut self.http_timeout_ms, "http_timeout_ms", 1, MAX_TIMEOUT_MS, default_http_timeout_ms());
        in_range(&mut self.retry_count, "retry_count", 0, MAX_RETRY_COUNT, default_retry_count());
        in_range(
            &mut self.probe_interval_secs,
            "probe_interval_secs",
            1,
            MAX_INTERVAL_SECS,
            default_probe_interval_secs(),
        );
        in_range(&mut self.probe_timeout_ms, "probe_timeout_ms", 1, MAX_TIMEOUT_MS, default_probe_timeout_ms());
        in_range(
            &mut self.sync_retry_interval_secs,
            "sync_retry_interval_secs",
            1,
            MAX_INTERVAL_SECS,
            default_sync_retry_interval_secs(),
        );
        in_range(&mut self.idle_sync_secs, "idle_sync_secs", 1, MAX_INTERVAL_SECS, default_idle_sync_secs());
        in_range(
            &mut self.heartbeat_interval_secs,
            "heartbeat_interval_secs",
            1,
            MAX_INTERVAL_SECS,
            default_heartbeat_interval_secs(),
        );
        self
    }

    /// Saves configuration to `path` with a fresh `last_update` marker.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.last_update = Some(chrono::Utc::now().to_rfc3339());
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn sync_retry_interval(&self) -> Duration {
        Duration::from_secs(self.sync_retry_interval_secs)
    }

    pub fn idle_sync(&self) -> Duration {
        Duration::from_secs(self.idle_sync_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

fn read_key<T: DeserializeOwned>(table: &toml::Table, key: &str, default: impl FnOnce() -> T) -> T {
    let Some(value) = table.get(key) else {
        return default();
    };
    match value.clone().try_into::<T>() {
        Ok(v) => v,
        Err(e) => {
            warn!(key, error = %e, "invalid config value, using default");
            default()
        }
    }
}

fn in_range<T>(value: &mut T, key: &str, min: T, max: T, default: T)
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    if *value < min || *value > max {
        warn!(key, value = %value, min = %min, max = %max, "out of range, using default");
        *value = default;
    }
}

/// Pick the data directory from the environment.
///
/// `ROLLCALL_STATE_DIR` wins, then `$XDG_STATE_HOME/rollcall`, then
/// `~/.local/state/rollcall`.
pub fn default_data_dir() -> PathBuf {
    resolve_data_dir(env::state_dir(), env::xdg_state_home(), dirs::home_dir())
}

fn resolve_data_dir(
    state_dir: Option<PathBuf>,
    xdg_state_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = state_dir {
        return dir;
    }
    if let Some(dir) = xdg_state_home {
        return dir.join(APP_DIR_NAME);
    }
    home.map(|h| h.join(".local/state").join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".local/state").join(APP_DIR_NAME))
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

pub fn backlog_path(data_dir: &Path) -> PathBuf {
    data_dir.join(BACKLOG_FILE_NAME)
}

pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
