//! Application configuration management.
//!
//! Holds the member API location and token and whether the mock backend is
//! used. Configuration is stored at `~/.config/back2back/config.json`; a few
//! fields can be overridden from the environment.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::client::DEFAULT_API_BASE_URL;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "back2back";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Simulated round trip for the mock backend
const DEFAULT_MOCK_LATENCY_MS: u64 = 500;

pub const ENV_API_BASE_URL: &str = "B2B_API_BASE_URL";
pub const ENV_API_TOKEN: &str = "B2B_API_TOKEN";
pub const ENV_USE_MOCK: &str = "B2B_USE_MOCK";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub use_mock_api: bool,
    pub mock_latency_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: None,
            use_mock_api: true,
            mock_latency_ms: DEFAULT_MOCK_LATENCY_MS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Apply `B2B_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.api_token = Some(token);
        }
        if let Some(flag) = lookup(ENV_USE_MOCK) {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.use_mock_api = true,
                "0" | "false" | "no" => self.use_mock_api = false,
                other => warn!(value = other, "Ignoring unrecognized {}", ENV_USE_MOCK),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_use_mock() {
        let config = Config::default();
        assert!(config.use_mock_api);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"use_mock_api": false}"#).unwrap();
        assert!(!config.use_mock_api);
        assert_eq!(config.mock_latency_ms, DEFAULT_MOCK_LATENCY_MS);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_BASE_URL, "http://localhost:8080"),
            (ENV_API_TOKEN, "secret"),
            (ENV_USE_MOCK, "false"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert!(!config.use_mock_api);
    }

    #[test]
    fn test_unrecognized_mock_flag_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|name| (name == ENV_USE_MOCK).then(|| "maybe".to_string()));
        assert!(config.use_mock_api);
    }
}
