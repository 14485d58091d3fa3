//! Process configuration
//!
//! Defaults, optionally overridden by a JSON file named in `FLATKV_CONFIG`,
//! then by individual environment variables.

use crate::snapshot::{SnapshotConfig, SyncPolicy};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an optional JSON config file
pub const CONFIG_FILE_ENV: &str = "FLATKV_CONFIG";
/// Overrides [`Config::data_file`]
pub const DATA_FILE_ENV: &str = "FLATKV_DATA_FILE";
/// Overrides [`Config::sync_policy`]
pub const SYNC_POLICY_ENV: &str = "FLATKV_SYNC_POLICY";
/// Overrides [`Config::web_addr`]
pub const WEB_ADDR_ENV: &str = "FLATKV_WEB_ADDR";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Snapshot file path
    pub data_file: PathBuf,
    /// Snapshot sync policy
    pub sync_policy: SyncPolicy,
    /// HTTP listen address
    pub web_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: PathBuf::from("datastore.json"),
            sync_policy: SyncPolicy::default(),
            web_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration using `lookup` to read variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_FILE_ENV) {
            Some(path) => Self::from_file(&path)?,
            None => Config::default(),
        };

        if let Some(data_file) = lookup(DATA_FILE_ENV) {
            config.data_file = PathBuf::from(data_file);
        }

        if let Some(policy) = lookup(SYNC_POLICY_ENV) {
            config.sync_policy = policy
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid {}", SYNC_POLICY_ENV))?;
        }

        if let Some(addr) = lookup(WEB_ADDR_ENV) {
            config.web_addr = addr;
        }

        Ok(config)
    }

    /// Read a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {:?}", path))
    }

    /// Snapshot settings for opening the store
    pub fn snapshot(&self) -> SnapshotConfig {
        SnapshotConfig::new(&self.data_file).with_sync_policy(self.sync_policy)
    }
}
