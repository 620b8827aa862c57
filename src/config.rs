use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::workspace::split::{DEFAULT_RATIO, MAX_RATIO, MIN_RATIO};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_offline")]
    pub offline: bool,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width: u16,
    #[serde(default = "default_split_ratio")]
    pub split_ratio: f64,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_api_url() -> String {
    "http://localhost:3000/api".to_string()
}
fn default_request_timeout_secs() -> u64 {
    20
}
fn default_offline() -> bool {
    false
}
fn default_tick_rate_ms() -> u64 {
    100
}
fn default_sidebar_width() -> u16 {
    32
}
fn default_split_ratio() -> f64 {
    DEFAULT_RATIO
}
fn default_log_filter() -> String {
    "kata_dojo=info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            offline: default_offline(),
            tick_rate_ms: default_tick_rate_ms(),
            sidebar_width: default_sidebar_width(),
            split_ratio: default_split_ratio(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kata-dojo")
            .join("config.toml")
    }

    /// Clamp values a hand-edited file may have pushed out of range.
    pub fn validate(&mut self) {
        if !(MIN_RATIO..=MAX_RATIO).contains(&self.split_ratio) {
            self.split_ratio = default_split_ratio();
        }
        self.tick_rate_ms = self.tick_rate_ms.clamp(16, 1000);
        self.sidebar_width = self.sidebar_width.clamp(16, 80);
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_request_timeout_secs();
        }
        if self.api_url.trim().is_empty() {
            self.api_url = default_api_url();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert!(!config.offline);
        assert_eq!(config.split_ratio, DEFAULT_RATIO);
        assert_eq!(config.log_filter, "kata_dojo=info");
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let toml_str = r#"
api_url = "http://katas.example:8080/api"
offline = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_url, "http://katas.example:8080/api");
        assert!(config.offline);
        assert_eq!(config.sidebar_width, 32);
        assert_eq!(config.tick_rate_ms, 100);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.api_url, deserialized.api_url);
        assert_eq!(config.split_ratio, deserialized.split_ratio);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.split_ratio = 0.95;
        config.tick_rate_ms = 0;
        config.sidebar_width = 500;
        config.request_timeout_secs = 0;
        config.api_url = "  ".to_string();
        config.validate();

        assert_eq!(config.split_ratio, DEFAULT_RATIO);
        assert_eq!(config.tick_rate_ms, 16);
        assert_eq!(config.sidebar_width, 80);
        assert_eq!(config.request_timeout_secs, 20);
        assert_eq!(config.api_url, "http://localhost:3000/api");
    }
}
