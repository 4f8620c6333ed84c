//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! backend URL, where the session is kept, the profile endpoint, and the
//! last used username.
//!
//! Configuration is stored at `~/.config/servicebook/config.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::client::DEFAULT_PROFILE_PATH;
use crate::auth::{FileStorage, KeyringStorage, SessionStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "servicebook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding `api_url`
pub const API_URL_ENV: &str = "SERVICEBOOK_API_URL";

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Where session credentials are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file in the data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub storage: StorageBackend,
    pub profile_path: String,
    pub last_username: Option<String>,
    /// Also write logs to a daily file in the data directory
    pub log_to_file: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            storage: StorageBackend::default(),
            profile_path: DEFAULT_PROFILE_PATH.to_string(),
            last_username: None,
            log_to_file: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                debug!(api_url = url, "API URL taken from environment");
                self.api_url = url.to_string();
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the session file and logs
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Open the session store on the configured backend
    pub fn open_session(&self) -> Result<SessionStore> {
        let store = match self.storage {
            StorageBackend::File => {
                let storage = FileStorage::open(&self.data_dir()?)
                    .context("Failed to open session file")?;
                SessionStore::new(storage)
            }
            StorageBackend::Keyring => SessionStore::new(KeyringStorage::new()),
        };
        Ok(store)
    }
}
