// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is read from `redial.toml` (by default under the user's
//! config directory) and includes:
//! - `probe_url`: endpoint used to test connectivity while down
//! - `check_interval_ms`: delay between connectivity checks
//! - `timeout_ms`: per-request timeout for the HTTP transport
//! - `base_url`: prefix for relative request URLs
//! - `store`: path of the pending-request store
//! - `[headers]`: headers sent with every request

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use redial_core::MonitorConfig;

use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "redial";
const CONFIG_FILE_NAME: &str = "redial.toml";
const STORE_FILE_NAME: &str = "pending.jsonl";

/// Settings stored in `redial.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Probe endpoint. Without one, recovery is assumed after one interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_url: Option<String>,
    /// Delay between connectivity checks in milliseconds (default: 60000).
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    /// Per-request timeout in milliseconds (default: 10000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Prefix joined onto URLs that are not absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Pending-request store location (default: user state directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

fn default_check_interval_ms() -> u64 {
    60_000
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            probe_url: None,
            check_interval_ms: default_check_interval_ms(),
            timeout_ms: default_timeout_ms(),
            base_url: None,
            store: None,
            headers: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads and validates the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads an explicitly named config file, or the default one if it exists.
    ///
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Config::load(path)
            }
            None => {
                let path = default_config_path();
                if path.exists() {
                    Config::load(&path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.check_interval_ms == 0 {
            return Err(Error::Config(
                "check_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(Error::Config(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(url) = &self.probe_url {
            if !is_absolute_url(url) {
                return Err(Error::Config(format!(
                    "probe_url must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }
        if let Some(url) = &self.base_url {
            if !is_absolute_url(url) {
                return Err(Error::Config(format!(
                    "base_url must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        let config = MonitorConfig::new().with_check_interval(self.check_interval());
        match &self.probe_url {
            Some(url) => config.with_probe_url(url.clone()),
            None => config,
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(default_store_path)
    }

    /// Joins relative URLs onto `base_url`. Absolute URLs pass through.
    pub fn resolve_url(&self, url: &str) -> Result<String> {
        if is_absolute_url(url) {
            return Ok(url.to_string());
        }
        match &self.base_url {
            Some(base) => Ok(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            )),
            None => Err(Error::Config(format!(
                "relative URL '{}' needs base_url to be configured",
                url
            ))),
        }
    }
}

fn is_absolute_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Returns the redial config directory (`~/.config/redial` on Linux).
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Returns the redial state directory.
///
/// Falls back to the local data directory on platforms without a state dir.
pub fn state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

pub fn default_store_path() -> PathBuf {
    state_dir().join(STORE_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
