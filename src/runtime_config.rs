//! # Runtime Configuration Module
//!
//! Per-router configuration. Every [`Router`](crate::router::Router) owns its
//! own [`RouterConfig`]; nothing here is process-global.
//!
//! ## Recognized options
//!
//! | key              | type           | default |
//! |------------------|----------------|---------|
//! | `useHistoryMode` | bool           | `false` |
//! | `basePath`       | string         | `""`    |
//! | `loggingLevel`   | `LOW` / `HIGH` | `LOW`   |
//! | `DEBUG`          | bool           | `true`  |
//!
//! Any other key is kept verbatim in [`RouterConfig::extra`].
//!
//! ## Sources
//!
//! - [`RouterConfig::load`] reads YAML, TOML or JSON by file extension
//! - [`RouterConfig::merge`] deep-merges a JSON value over the current config
//! - [`RouterConfig::with_env_overrides`] applies environment variables:
//!
//! ```bash
//! export BRRTNAV_BASE_PATH=/app
//! export BRRTNAV_USE_HISTORY_MODE=true
//! export BRRTNAV_LOGGING_LEVEL=high
//! export BRRTNAV_DEBUG=false
//! ```

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::RouterError;

/// Verbosity of the router's own diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoggingLevel {
    #[default]
    Low,
    /// Trace every activation, invalidation and queued navigation
    High,
}

impl FromStr for LoggingLevel {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(LoggingLevel::Low),
            "HIGH" => Ok(LoggingLevel::High),
            other => Err(RouterError::InvalidConfig {
                reason: format!("unknown loggingLevel '{other}', expected LOW or HIGH"),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for LoggingLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for LoggingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingLevel::Low => f.write_str("LOW"),
            LoggingLevel::High => f.write_str("HIGH"),
        }
    }
}

/// Router configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouterConfig {
    /// Host hint: drive the router from pathnames instead of hash fragments
    #[serde(alias = "use_history_mode", alias = "useHistory")]
    pub use_history_mode: bool,
    /// Prefix stripped from every location before resolution
    #[serde(alias = "base_path")]
    pub base_path: String,
    #[serde(alias = "logging_level")]
    pub logging_level: LoggingLevel,
    /// Enables this router's welcome and `HIGH` level diagnostics
    #[serde(rename = "DEBUG", alias = "debug")]
    pub debug: bool,
    /// Unrecognized keys, carried through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            use_history_mode: false,
            base_path: String::new(),
            logging_level: LoggingLevel::Low,
            debug: true,
            extra: BTreeMap::new(),
        }
    }
}

impl RouterConfig {
    /// Defaults overlaid with `BRRTNAV_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `BRRTNAV_*` environment variables over this config.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Values that fail to parse leave the current setting in place.
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup("BRRTNAV_BASE_PATH") {
            self.base_path = base;
        }
        if let Some(history) = lookup("BRRTNAV_USE_HISTORY_MODE").and_then(|v| v.parse().ok()) {
            self.use_history_mode = history;
        }
        if let Some(level) = lookup("BRRTNAV_LOGGING_LEVEL").and_then(|v| v.parse().ok()) {
            self.logging_level = level;
        }
        if let Some(debug) = lookup("BRRTNAV_DEBUG").and_then(|v| v.parse().ok()) {
            self.debug = debug;
        }
        self
    }

    /// Build a config from a JSON value, starting from the defaults.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidConfig`] if a recognized key has the wrong type.
    pub fn from_value(value: Value) -> Result<Self, RouterError> {
        let mut config = Self::default();
        config.merge(value)?;
        Ok(config)
    }

    /// Deep-merge `changes` into this config.
    ///
    /// Objects merge key by key; any other value replaces what was there.
    /// `null` merges nothing.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidConfig`] if the merged result no longer
    /// deserializes, e.g. `loggingLevel: "MEDIUM"`. `self` is left unchanged.
    pub fn merge(&mut self, changes: Value) -> Result<(), RouterError> {
        if changes.is_null() {
            return Ok(());
        }
        let mut current = serde_json::to_value(&*self).map_err(|e| RouterError::InvalidConfig {
            reason: e.to_string(),
        })?;
        merge_values(&mut current, canonicalize_keys(changes));
        *self = serde_json::from_value(current).map_err(|e| RouterError::InvalidConfig {
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Load a config file: `.yaml`/`.yml`, `.toml`, otherwise JSON.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let value = read_structured(path)?;
        Self::from_value(value).with_context(|| format!("invalid config in {}", path.display()))
    }
}

/// Read a YAML, TOML or JSON file into a JSON value, by extension.
pub(crate) fn read_structured(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML {}", path.display()))?,
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("failed to parse TOML {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON {}", path.display()))?,
    };
    Ok(value)
}

/// Alternative spellings accepted for the recognized options.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("use_history_mode", "useHistoryMode"),
    ("useHistory", "useHistoryMode"),
    ("base_path", "basePath"),
    ("logging_level", "loggingLevel"),
    ("debug", "DEBUG"),
];

/// Rename aliased top-level keys to the names `RouterConfig` serializes with,
/// so a merged document never carries both spellings of one option.
fn canonicalize_keys(changes: Value) -> Value {
    match changes {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let key = KEY_ALIASES
                        .iter()
                        .find(|(alias, _)| *alias == key)
                        .map_or(key, |(_, canonical)| (*canonical).to_string());
                    (key, value)
                })
                .collect(),
        ),
        other => other,
    }
}

fn merge_values(dest: &mut Value, src: Value) {
    match (dest, src) {
        (Value::Object(dest), Value::Object(src)) => {
            for (key, value) in src {
                match dest.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_values(existing, value);
                    }
                    _ => {
                        dest.insert(key, value);
                    }
                }
            }
        }
        (dest, src) => *dest = src,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RouterConfig::default();
        assert!(!config.use_history_mode);
        assert_eq!(config.base_path, "");
        assert_eq!(config.logging_level, LoggingLevel::Low);
        assert!(config.debug);
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_logging_level_is_case_insensitive() {
        let config = RouterConfig::from_value(json!({ "loggingLevel": "high" })).unwrap();
        assert_eq!(config.logging_level, LoggingLevel::High);
        assert!("medium".parse::<LoggingLevel>().is_err());
    }

    #[test]
    fn test_unknown_keys_are_carried() {
        let config = RouterConfig::from_value(json!({
            "basePath": "/app",
            "theme": { "dark": true }
        }))
        .unwrap();
        assert_eq!(config.base_path, "/app");
        assert_eq!(config.extra["theme"], json!({ "dark": true }));
    }

    #[test]
    fn test_merge_is_deep_and_leaves_self_on_error() {
        let mut config = RouterConfig::from_value(json!({ "theme": { "dark": true } })).unwrap();
        config
            .merge(json!({ "theme": { "accent": "red" }, "DEBUG": false }))
            .unwrap();
        assert_eq!(config.extra["theme"], json!({ "dark": true, "accent": "red" }));
        assert!(!config.debug);

        let before = config.clone();
        let err = config.merge(json!({ "loggingLevel": "MEDIUM" })).unwrap_err();
        assert!(matches!(err, RouterError::InvalidConfig { .. }));
        assert_eq!(config, before);
    }

    #[test]
    fn test_snake_case_aliases() {
        let config = RouterConfig::from_value(json!({
            "base_path": "/docs",
            "use_history_mode": true
        }))
        .unwrap();
        assert_eq!(config.base_path, "/docs");
        assert!(config.use_history_mode);
    }

    #[test]
    fn test_merge_accepts_aliases_over_existing_values() {
        let mut config = RouterConfig::from_value(json!({ "basePath": "/app" })).unwrap();
        config
            .merge(json!({
                "debug": false,
                "base_path": "/docs",
                "useHistory": true,
                "logging_level": "high"
            }))
            .unwrap();
        assert!(!config.debug);
        assert_eq!(config.base_path, "/docs");
        assert!(config.use_history_mode);
        assert_eq!(config.logging_level, LoggingLevel::High);
        assert!(config.extra.is_empty());

        let config = RouterConfig::default();
        let mut merged = config.clone();
        merged.merge(json!({ "DEBUG": true, "use_history_mode": false })).unwrap();
        assert_eq!(merged, config);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BRRTNAV_BASE_PATH", "/shop"),
            ("BRRTNAV_LOGGING_LEVEL", "High"),
            ("BRRTNAV_DEBUG", "not-a-bool"),
        ]
        .into_iter()
        .collect();

        let config = RouterConfig::default()
            .with_overrides_from(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.base_path, "/shop");
        assert_eq!(config.logging_level, LoggingLevel::High);
        assert!(config.debug);
    }
}
