// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI configuration.
//!
//! Configuration is read from the first of:
//! - the file named by `--config`
//! - `./finlink.toml`
//! - `$XDG_CONFIG_HOME/finlink/config.toml`
//!
//! Every field is optional. `FINLINK_BASE_URL` and `FINLINK_DATA_DIR`
//! override the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fl_core::backoff::RetryPolicy;
use fl_core::DispatcherConfig;

use crate::env;
use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "finlink";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOCAL_CONFIG_FILE_NAME: &str = "finlink.toml";
const TOKEN_FILE_NAME: &str = "token";

/// Settings for talking to the backend and where to keep local state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the finance API.
    pub base_url: String,
    /// Directory holding the offline queue, cache, and token.
    pub data_dir: Option<PathBuf>,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Attempts per request, including the first.
    pub max_attempts: u32,
    /// Linear backoff unit in milliseconds.
    pub base_delay_ms: u64,
    /// Ceiling for a single backoff delay in milliseconds.
    pub max_delay_ms: u64,
    /// Health endpoint used for reachability checks, relative to `base_url`.
    pub health_path: String,
    /// Bearer token file. Defaults to `<data_dir>/token`.
    pub token_file: Option<PathBuf>,
    /// Append logs here in addition to stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Config {
            base_url: "http://127.0.0.1:3000/api".to_string(),
            data_dir: None,
            timeout_ms: millis(fl_core::dispatcher::DEFAULT_TIMEOUT),
            max_attempts: retry.max_attempts,
            base_delay_ms: millis(retry.base_delay),
            max_delay_ms: millis(retry.max_delay),
            health_path: "/health".to_string(),
            token_file: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Parses a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// Loads configuration from the search path and applies environment
    /// overrides. Missing files yield defaults, except an explicit path.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) if !path.is_file() => {
                return Err(Error::ConfigNotFound(path.display().to_string()))
            }
            Some(path) => Self::from_file(path)?,
            None => match find_config_file() {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "using config file");
                    Self::from_file(&path)?
                }
                None => Config::default(),
            },
        };
        Ok(config.with_overrides(env::base_url(), env::data_dir()))
    }

    /// Applies environment overrides.
    pub fn with_overrides(mut self, base_url: Option<String>, data_dir: Option<PathBuf>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(dir) = data_dir {
            self.data_dir = Some(dir);
        }
        self
    }

    /// Directory for persisted state.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn token_path(&self) -> PathBuf {
        self.token_file
            .clone()
            .unwrap_or_else(|| self.data_dir().join(TOKEN_FILE_NAME))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
            self.max_attempts,
        )
    }

    /// Dispatcher settings; fails if `base_url` is not an http(s) URL.
    pub fn dispatcher_config(&self) -> Result<DispatcherConfig> {
        Ok(DispatcherConfig::new(&self.base_url)?
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_retry(self.retry_policy()))
    }
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
