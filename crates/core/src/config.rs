//! Application configuration.
//!
//! Settings come from `<config_dir>/banknotes/config.toml` when present,
//! overridden by `BANKNOTES_*` environment variables.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory under the user's config directory holding our files.
pub const APP_DIR: &str = "banknotes";

const DEFAULT_CONFIG: &str = r#"# Banknote catalog browser configuration.

# Catalog service base URL.
api_base_url = "http://localhost:8080/api"

# Collector whose collection is loaded; leave empty to skip the collection.
session = ""

# Directory for preferences.
# data_root = "/home/me/.local/share/banknotes"

# Fetch attempts per dataset and the pause after each failure.
retry_attempts = 3
retry_delay_ms = 1000
request_timeout_secs = 15

# Limit denominations to notes issued within these years.
# denomination_from = 1900
# denomination_to = 2000
"#;

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog service base URL.
    pub api_base_url: String,
    /// Collector session; `None` skips the collection.
    pub session: Option<String>,
    /// Directory holding preferences.
    pub data_root: PathBuf,
    /// Fetch attempts per dataset.
    pub retry_attempts: usize,
    /// Pause after each failed attempt, in milliseconds.
    pub retry_delay_ms: u64,
    /// Per-request timeout, in seconds.
    pub request_timeout_secs: u64,
    /// First issue year of the denomination listing.
    pub denomination_from: Option<i32>,
    /// Last issue year of the denomination listing.
    pub denomination_to: Option<i32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            session: None,
            data_root: default_data_root(),
            retry_attempts: 3,
            retry_delay_ms: 1_000,
            request_timeout_secs: 15,
            denomination_from: None,
            denomination_to: None,
        }
    }
}

impl AppConfig {
    /// Load from the default config file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from `path` (optional) and the environment.
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path.clone()).required(false))
            .add_source(Environment::with_prefix("BANKNOTES"))
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;
        let mut config: AppConfig = settings
            .try_deserialize()
            .context("invalid configuration")?;
        if config
            .session
            .as_deref()
            .is_some_and(|session| session.trim().is_empty())
        {
            config.session = None;
        }
        Ok(config)
    }

    /// Path of the preference file.
    pub fn preferences_path(&self) -> PathBuf {
        self.data_root.join("preferences.json")
    }
}

/// Location of the configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

fn default_data_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Write a commented default configuration file if none exists.
pub fn ensure_default_config() -> Result<()> {
    let path = config_path();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote default configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay_ms, 1_000);
        assert_eq!(config.session, None);
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_base_url = \"https://notes.example/api\"\nsession = \"alice\"\ndenomination_from = 1950\n",
        )?;
        let config = AppConfig::load_from(path)?;
        assert_eq!(config.api_base_url, "https://notes.example/api");
        assert_eq!(config.session.as_deref(), Some("alice"));
        assert_eq!(config.denomination_from, Some(1950));
        assert_eq!(config.request_timeout_secs, 15);
        Ok(())
    }

    #[test]
    fn blank_session_is_none() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, DEFAULT_CONFIG)?;
        let config = AppConfig::load_from(path)?;
        assert_eq!(config.session, None);
        Ok(())
    }
}
