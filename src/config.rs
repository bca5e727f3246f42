//! Runtime configuration read from environment variables
//!
//! `main` loads a `.env` file first, so every variable can live there too.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::coordination::{CompletionPolicy, GeneratorConfig, LifecycleSettings};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_CLAIM_TTL_SECS: i64 = 1800;
const DEFAULT_ACTIVITY_DIR: &str = "/tmp/bzzz_activity";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors from invalid configuration values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("HIVE_GENERATOR_MIN_SECS ({min}) is greater than HIVE_GENERATOR_MAX_SECS ({max})")]
    IntervalOrder { min: u64, max: u64 },
}

/// Where activity records go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitySinkKind {
    Jsonl,
    Disabled,
}

impl FromStr for ActivitySinkKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "jsonl" => Ok(ActivitySinkKind::Jsonl),
            "none" => Ok(ActivitySinkKind::Disabled),
            other => Err(format!("unknown sink '{}' (expected jsonl or none)", other)),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub lifecycle: LifecycleSettings,
    pub activity_sink: ActivitySinkKind,
    pub activity_dir: PathBuf,
    pub sample_active_repos: bool,
    pub generator: GeneratorConfig,
    pub log_level: String,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr = parse_or(&lookup, "HIVE_BIND_ADDR", || {
            SocketAddr::from_str(DEFAULT_BIND_ADDR).map_err(|e| e.to_string())
        })?;

        let ttl_secs: i64 =
            parse_or(&lookup, "HIVE_CLAIM_TTL_SECS", || Ok(DEFAULT_CLAIM_TTL_SECS))?;
        let completion_policy: CompletionPolicy =
            parse_or(&lookup, "HIVE_COMPLETION_POLICY", || Ok(CompletionPolicy::default()))?;
        let invalid_ttl = |reason: String| ConfigError::Invalid {
            key: "HIVE_CLAIM_TTL_SECS",
            value: ttl_secs.to_string(),
            reason,
        };
        let claim_ttl = chrono::Duration::try_seconds(ttl_secs)
            .ok_or_else(|| invalid_ttl("out of range".to_string()))?;
        let lifecycle = LifecycleSettings::new(claim_ttl, completion_policy)
            .map_err(|e| invalid_ttl(e.to_string()))?;

        let activity_sink =
            parse_or(&lookup, "HIVE_ACTIVITY_SINK", || Ok(ActivitySinkKind::Jsonl))?;
        let activity_dir = lookup("HIVE_ACTIVITY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ACTIVITY_DIR));
        let sample_active_repos = parse_flag(&lookup, "HIVE_SAMPLE_ACTIVE_REPOS", false)?;

        let defaults = GeneratorConfig::default();
        let min_secs = parse_or(&lookup, "HIVE_GENERATOR_MIN_SECS", || {
            Ok(defaults.min_interval.as_secs())
        })?;
        let max_secs = parse_or(&lookup, "HIVE_GENERATOR_MAX_SECS", || {
            Ok(defaults.max_interval.as_secs())
        })?;
        if min_secs > max_secs {
            return Err(ConfigError::IntervalOrder {
                min: min_secs,
                max: max_secs,
            });
        }
        let probability: f64 =
            parse_or(&lookup, "HIVE_GENERATOR_PROBABILITY", || Ok(defaults.probability))?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::Invalid {
                key: "HIVE_GENERATOR_PROBABILITY",
                value: probability.to_string(),
                reason: "must be between 0 and 1".to_string(),
            });
        }
        let generator = GeneratorConfig {
            enabled: parse_flag(&lookup, "HIVE_GENERATOR_ENABLED", defaults.enabled)?,
            min_interval: Duration::from_secs(min_secs),
            max_interval: Duration::from_secs(max_secs),
            probability,
        };

        Ok(Self {
            bind_addr,
            lifecycle,
            activity_sink,
            activity_dir,
            sample_active_repos,
            generator,
            log_level: lookup("HIVE_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

fn parse_or<T, L, D>(lookup: &L, key: &'static str, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    L: Fn(&str) -> Option<String>,
    D: FnOnce() -> Result<T, String>,
{
    match lookup(key) {
        Some(value) => value.parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
        None => default().map_err(|reason| ConfigError::Invalid {
            key,
            value: String::new(),
            reason,
        }),
    }
}

fn parse_flag<L>(lookup: &L, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };

    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_reference_server() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.lifecycle, LifecycleSettings::default());
        assert_eq!(config.activity_sink, ActivitySinkKind::Jsonl);
        assert_eq!(config.activity_dir, PathBuf::from("/tmp/bzzz_activity"));
        assert!(!config.sample_active_repos);
        assert_eq!(config.generator, GeneratorConfig::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("HIVE_BIND_ADDR", "127.0.0.1:8080"),
            ("HIVE_CLAIM_TTL_SECS", "60"),
            ("HIVE_COMPLETION_POLICY", "holder_only"),
            ("HIVE_ACTIVITY_SINK", "none"),
            ("HIVE_ACTIVITY_DIR", "/var/lib/hive"),
            ("HIVE_SAMPLE_ACTIVE_REPOS", "yes"),
            ("HIVE_GENERATOR_ENABLED", "false"),
            ("HIVE_GENERATOR_MIN_SECS", "5"),
            ("HIVE_GENERATOR_MAX_SECS", "5"),
            ("HIVE_GENERATOR_PROBABILITY", "1"),
            ("HIVE_LOG_LEVEL", "debug"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.lifecycle.claim_ttl, chrono::Duration::seconds(60));
        assert_eq!(config.lifecycle.completion_policy, CompletionPolicy::HolderOnly);
        assert_eq!(config.activity_sink, ActivitySinkKind::Disabled);
        assert_eq!(config.activity_dir, PathBuf::from("/var/lib/hive"));
        assert!(config.sample_active_repos);
        assert!(!config.generator.enabled);
        assert_eq!(config.generator.min_interval, Duration::from_secs(5));
        assert_eq!(config.generator.probability, 1.0);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("HIVE_CLAIM_TTL_SECS", "  ")]).unwrap();
        assert_eq!(config.lifecycle.claim_ttl, chrono::Duration::seconds(1800));
    }

    #[test]
    fn rejects_invalid_values() {
        let err = config_from(&[("HIVE_CLAIM_TTL_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "HIVE_CLAIM_TTL_SECS", .. }));

        let err = config_from(&[("HIVE_CLAIM_TTL_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "HIVE_CLAIM_TTL_SECS", .. }));

        let err = config_from(&[("HIVE_COMPLETION_POLICY", "anyone")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "HIVE_COMPLETION_POLICY", .. }));

        let err = config_from(&[("HIVE_GENERATOR_PROBABILITY", "1.5")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "HIVE_GENERATOR_PROBABILITY", .. }));

        let err = config_from(&[("HIVE_SAMPLE_ACTIVE_REPOS", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "HIVE_SAMPLE_ACTIVE_REPOS", .. }));
    }

    #[test]
    fn rejects_inverted_generator_interval() {
        let err = config_from(&[
            ("HIVE_GENERATOR_MIN_SECS", "200"),
            ("HIVE_GENERATOR_MAX_SECS", "100"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::IntervalOrder { min: 200, max: 100 });
    }
}
