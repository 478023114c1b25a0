//! Runtime configuration resolved from the environment.

use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

use stockscan_observability::LogFormat;

use crate::scanner::{DEFAULT_SCAN_COOLDOWN_MS, MAX_SCAN_COOLDOWN_MS};

pub const ENV_DATA_DIR: &str = "STOCKSCAN_DATA_DIR";
pub const ENV_SCAN_COOLDOWN_MS: &str = "STOCKSCAN_SCAN_COOLDOWN_MS";
pub const ENV_LOG_JSON: &str = "STOCKSCAN_LOG_JSON";

const DATABASE_FILE: &str = "stockscan.db";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub scan_cooldown_ms: i64,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            scan_cooldown_ms: DEFAULT_SCAN_COOLDOWN_MS,
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup` (the environment, in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir.trim());
        }

        if let Some(raw) = lookup(ENV_SCAN_COOLDOWN_MS) {
            config.scan_cooldown_ms = raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|ms| (0..=MAX_SCAN_COOLDOWN_MS).contains(ms))
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_SCAN_COOLDOWN_MS,
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = lookup(ENV_LOG_JSON) {
            config.log_format = if parse_flag(ENV_LOG_JSON, &raw)? {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            };
        }

        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn scan_cooldown(&self) -> Duration {
        Duration::milliseconds(self.scan_cooldown_ms)
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}

/// `{local app data}/stockscan`, or `./.stockscan` when the OS offers none.
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .map(|base| base.join("stockscan"))
        .unwrap_or_else(|| PathBuf::from(".stockscan"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.scan_cooldown_ms, 2_000);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.database_path().ends_with("stockscan.db"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/tmp/inv"),
            (ENV_SCAN_COOLDOWN_MS, "750"),
            (ENV_LOG_JSON, "true"),
        ]))
        .unwrap();

        assert_eq!(config.database_path(), PathBuf::from("/tmp/inv/stockscan.db"));
        assert_eq!(config.scan_cooldown(), Duration::milliseconds(750));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_cooldown_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_SCAN_COOLDOWN_MS, "-5")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_SCAN_COOLDOWN_MS,
                value: "-5".to_string()
            }
        );
    }

    #[test]
    fn cooldown_above_the_ceiling_is_rejected() {
        let huge = i64::MAX.to_string();
        let err = AppConfig::from_lookup(lookup(&[(ENV_SCAN_COOLDOWN_MS, huge.as_str())]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_SCAN_COOLDOWN_MS, .. }));

        let max = MAX_SCAN_COOLDOWN_MS.to_string();
        let config = AppConfig::from_lookup(lookup(&[(ENV_SCAN_COOLDOWN_MS, max.as_str())])).unwrap();
        assert_eq!(config.scan_cooldown(), Duration::milliseconds(MAX_SCAN_COOLDOWN_MS));
    }

    #[test]
    fn invalid_flag_is_rejected() {
        assert!(AppConfig::from_lookup(lookup(&[(ENV_LOG_JSON, "maybe")])).is_err());
    }
}
