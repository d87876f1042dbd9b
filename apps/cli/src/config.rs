use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use finboard_api::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use finboard_query::{CacheConfig, DEFAULT_GC_TIME, DEFAULT_STALE_TIME};

pub const ENV_API_URL: &str = "FINBOARD_API_URL";
pub const ENV_API_TOKEN: &str = "FINBOARD_API_TOKEN";
pub const ENV_TIMEOUT_MS: &str = "FINBOARD_TIMEOUT_MS";
pub const ENV_STALE_SECS: &str = "FINBOARD_STALE_SECS";
pub const ENV_GC_SECS: &str = "FINBOARD_GC_SECS";
pub const ENV_EXPORT_DIR: &str = "FINBOARD_EXPORT_DIR";

/// Runtime settings of the command-line client, read from the environment
/// (and a `.env` file, loaded by `main`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
    pub stale_time: Duration,
    pub gc_time: Duration,
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
            export_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Unset or blank
    /// variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| -> Option<String> {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Config::default();
        if let Some(url) = var(ENV_API_URL) {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        config.api_token = var(ENV_API_TOKEN);
        if let Some(ms) = var(ENV_TIMEOUT_MS) {
            config.timeout = Duration::from_millis(parse_number(ENV_TIMEOUT_MS, &ms)?);
        }
        if let Some(secs) = var(ENV_STALE_SECS) {
            config.stale_time = Duration::from_secs(parse_number(ENV_STALE_SECS, &secs)?);
        }
        if let Some(secs) = var(ENV_GC_SECS) {
            config.gc_time = Duration::from_secs(parse_number(ENV_GC_SECS, &secs)?);
        }
        if let Some(dir) = var(ENV_EXPORT_DIR) {
            config.export_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.api_url).with_timeout(self.timeout)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default()
            .with_stale_time(self.stale_time)
            .with_gc_time(self.gc_time)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .with_context(|| format!("{} must be a whole number, got '{}'", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_config().base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cache_config(), CacheConfig::default());
    }

    #[test]
    fn test_reads_overrides() {
        let config = config_from(&[
            (ENV_API_URL, "https://finance.example.com/api/"),
            (ENV_API_TOKEN, "abc"),
            (ENV_TIMEOUT_MS, "2500"),
            (ENV_STALE_SECS, "0"),
            (ENV_GC_SECS, "60"),
            (ENV_EXPORT_DIR, "/tmp/exports"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://finance.example.com/api");
        assert_eq!(config.api_token.as_deref(), Some("abc"));
        assert_eq!(config.api_config().timeout, Duration::from_millis(2500));
        assert_eq!(config.cache_config().stale_time, Duration::ZERO);
        assert_eq!(config.cache_config().gc_time, Duration::from_secs(60));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = config_from(&[(ENV_API_TOKEN, "  "), (ENV_TIMEOUT_MS, "")]).unwrap();
        assert_eq!(config.api_token, None);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_rejects_non_numeric_durations() {
        let err = config_from(&[(ENV_TIMEOUT_MS, "soon")]).unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_MS));
    }
}
