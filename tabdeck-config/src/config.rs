//! `Config` struct, YAML persistence and path resolution.
//!
//! Covers:
//! - `load` / `save` (YAML file I/O with atomic write)
//! - XDG-compliant path helpers (`config_path`, `config_dir`, `session_snapshot_path`)
//! - Semantic validation of loaded values

use crate::defaults;
use crate::error::ConfigError;
use crate::types::LogLevel;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory name under the platform config directory.
const APP_DIR: &str = "tabdeck";

/// Default snapshot file name inside the config directory.
const SNAPSHOT_FILENAME: &str = "last_session.yaml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Minimum level written to the debug log
    #[serde(default = "defaults::log_level")]
    pub log_level: LogLevel,

    /// Session snapshot/restore tuning
    #[serde(default)]
    pub session: SessionConfig,
}

/// Session persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Restore the previous tab arrangement on startup
    #[serde(default = "defaults::bool_true")]
    pub restore_on_startup: bool,

    /// Debounce delay (ms) between the last tab change and the snapshot write
    #[serde(default = "defaults::save_debounce_ms")]
    pub save_debounce_ms: u64,

    /// Snapshots older than this many hours are discarded on startup
    #[serde(default = "defaults::max_snapshot_age_hours")]
    pub max_snapshot_age_hours: u64,

    /// Upper bound on terminals recreated during one restore
    #[serde(default = "defaults::max_restored_terminals")]
    pub max_restored_terminals: usize,

    /// Override for the snapshot file location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_file: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            restore_on_startup: defaults::bool_true(),
            save_debounce_ms: defaults::save_debounce_ms(),
            max_snapshot_age_hours: defaults::max_snapshot_age_hours(),
            max_restored_terminals: defaults::max_restored_terminals(),
            snapshot_file: None,
        }
    }
}

impl SessionConfig {
    /// Debounce delay as a `Duration`
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    /// Maximum snapshot age as a `Duration`
    pub fn max_snapshot_age(&self) -> Duration {
        Duration::from_secs(self.max_snapshot_age_hours.saturating_mul(3600))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, creating it with defaults if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        log::info!("Config path: {:?}", config_path);

        if !config_path.exists() {
            log::info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            if let Err(e) = config.save_to(config_path) {
                log::error!("Failed to save default config: {}", e);
                return Err(e);
            }
            return Ok(config);
        }

        let contents = fs::read_to_string(config_path)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to read config from {:?}", config_path))?;

        let config: Config = serde_yaml_ng::from_str(&contents)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to parse config from {:?}", config_path))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let yaml = serde_yaml_ng::to_string(self).context("Failed to serialize config")?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = config_path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)
            .with_context(|| format!("Failed to write config to {:?}", temp_path))?;
        fs::rename(&temp_path, config_path)
            .with_context(|| format!("Failed to move config into place at {:?}", config_path))?;

        Ok(())
    }

    /// Reject values the engine cannot operate with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let session = &self.session;
        if session.save_debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "session.save_debounce_ms must be greater than zero".to_string(),
            ));
        }
        if session.max_snapshot_age_hours == 0 {
            return Err(ConfigError::Validation(
                "session.max_snapshot_age_hours must be greater than zero".to_string(),
            ));
        }
        if session.restore_on_startup && session.max_restored_terminals == 0 {
            log::warn!("session.max_restored_terminals is 0: terminals will not be restored");
        }
        Ok(())
    }

    /// Get the configuration file path (using XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join(APP_DIR)
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            // Use XDG convention on all platforms: ~/.config/tabdeck
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join(APP_DIR)
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Where the session snapshot is stored
    pub fn session_snapshot_path(&self) -> PathBuf {
        self.session
            .snapshot_file
            .clone()
            .unwrap_or_else(|| Self::config_dir().join(SNAPSHOT_FILENAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_creates_default() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("config.yaml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "session:\n  max_restored_terminals: 3\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.session.max_restored_terminals, 3);
        assert_eq!(config.session.save_debounce_ms, 1000);
        assert_eq!(config.session.max_snapshot_age_hours, 168);
        assert!(config.session.restore_on_startup);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_zero_debounce_rejected() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "session:\n  save_debounce_ms: 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "session: [[[").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");

        let mut config = Config::default();
        config.log_level = LogLevel::Debug;
        config.session.snapshot_file = Some(temp.path().join("snap.yaml"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.session_snapshot_path(), temp.path().join("snap.yaml"));
        assert!(!path.with_extension("yaml.tmp").exists());
    }

    #[test]
    fn test_durations() {
        let session = SessionConfig::default();
        assert_eq!(session.save_debounce(), Duration::from_millis(1000));
        assert_eq!(session.max_snapshot_age(), Duration::from_secs(168 * 3600));
    }
}
