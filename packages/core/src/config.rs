//! Content tree configuration
//!
//! `NodeTreeConfig` is plain data: build it with `Default`, deserialize it from
//! the host application's settings, or read overrides from the environment
//! with `from_env()`. Always `validate()` before handing it to services.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding `version_timeout_secs`
pub const VERSION_TIMEOUT_ENV: &str = "NODETREE_VERSION_TIMEOUT";

/// Environment variable overriding `enforce_unique_translation_lang`
pub const UNIQUE_TRANSLATION_LANG_ENV: &str = "NODETREE_UNIQUE_TRANSLATION_LANG";

/// One week; longer windows would fold unrelated edits into one draft
const MAX_VERSION_TIMEOUT_SECS: u64 = 7 * 24 * 3600;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    InvalidEnv { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeTreeConfig {
    /// Edits to a translation within this many seconds of the last draft
    /// update are folded into that draft instead of creating a new version
    pub version_timeout_secs: u64,

    /// Reject a second translation with the same language on one node
    pub enforce_unique_translation_lang: bool,
}

impl Default for NodeTreeConfig {
    fn default() -> Self {
        Self {
            version_timeout_secs: 3600,
            enforce_unique_translation_lang: true,
        }
    }
}

impl NodeTreeConfig {
    /// Defaults overridden by any `NODETREE_*` environment variables present
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(VERSION_TIMEOUT_ENV) {
            config.version_timeout_secs =
                raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    key: VERSION_TIMEOUT_ENV.to_string(),
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = lookup(UNIQUE_TRANSLATION_LANG_ENV) {
            config.enforce_unique_translation_lang = match raw.trim() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: UNIQUE_TRANSLATION_LANG_ENV.to_string(),
                        value: raw,
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn version_timeout(&self) -> Duration {
        Duration::from_secs(self.version_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version_timeout_secs > MAX_VERSION_TIMEOUT_SECS {
            return Err(ConfigError::Invalid(format!(
                "version_timeout_secs cannot exceed {}",
                MAX_VERSION_TIMEOUT_SECS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = NodeTreeConfig::default();
        assert_eq!(config.version_timeout(), Duration::from_secs(3600));
        assert!(config.enforce_unique_translation_lang);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = NodeTreeConfig::from_lookup(lookup(&[
            (VERSION_TIMEOUT_ENV, "60"),
            (UNIQUE_TRANSLATION_LANG_ENV, "false"),
        ]))
        .unwrap();
        assert_eq!(config.version_timeout_secs, 60);
        assert!(!config.enforce_unique_translation_lang);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let err = NodeTreeConfig::from_lookup(lookup(&[(VERSION_TIMEOUT_ENV, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_validate_caps_timeout() {
        let config = NodeTreeConfig {
            version_timeout_secs: MAX_VERSION_TIMEOUT_SECS + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: NodeTreeConfig =
            serde_json::from_value(serde_json::json!({ "versionTimeoutSecs": 5 })).unwrap();
        // Field names are snake_case; unknown keys are ignored.
        assert_eq!(config, NodeTreeConfig::default());

        let config: NodeTreeConfig =
            serde_json::from_value(serde_json::json!({ "version_timeout_secs": 5 })).unwrap();
        assert_eq!(config.version_timeout_secs, 5);
        assert!(config.enforce_unique_translation_lang);
    }
}
