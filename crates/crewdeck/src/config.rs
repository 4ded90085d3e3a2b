// File: src/config.rs
// Purpose: Configuration parsing from crewdeck.toml

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub reminders: RemindersConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database URL (default: "sqlite::memory:")
    #[serde(default = "default_store_url")]
    pub url: String,
}

/// Snapshot delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Broadcast channel capacity per collection (default: 1000)
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// Reminder scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// Hours before a deadline that its reminder fires (default: 24)
    #[serde(default = "default_lead_hours")]
    pub lead_hours: i64,
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Minimum accepted password length (default: 6)
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

fn default_store_url() -> String {
    "sqlite::memory:".to_string()
}

fn default_channel_capacity() -> usize {
    1000
}

fn default_lead_hours() -> i64 {
    24
}

fn default_min_password_len() -> usize {
    6
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            lead_hours: default_lead_hours(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_len: default_min_password_len(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Load from `crewdeck.toml` in the working directory, or defaults
    /// when the file does not exist
    pub fn load_or_default() -> Result<Self> {
        let path = Path::new("crewdeck.toml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.url, "sqlite::memory:");
        assert_eq!(config.sync.channel_capacity, 1000);
        assert_eq!(config.reminders.lead_hours, 24);
        assert_eq!(config.auth.min_password_len, 6);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = Config::from_str(
            r#"
            [store]
            url = "sqlite:crewdeck.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.url, "sqlite:crewdeck.db");
        assert_eq!(config.sync.channel_capacity, 1000);
    }

    #[test]
    fn test_full_file() {
        let config = Config::from_str(
            r#"
            [store]
            url = "sqlite:data/app.db"

            [sync]
            channel_capacity = 64

            [reminders]
            lead_hours = 48

            [auth]
            min_password_len = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.store.url, "sqlite:data/app.db");
        assert_eq!(config.sync.channel_capacity, 64);
        assert_eq!(config.reminders.lead_hours, 48);
        assert_eq!(config.auth.min_password_len, 10);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(Config::from_str("[store\nurl = ").is_err());
    }
}
