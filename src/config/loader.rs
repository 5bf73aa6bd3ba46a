//! Configuration loading and layering
//!
//! Precedence order (highest to lowest):
//! 1. Command-line flags (applied by the caller)
//! 2. Environment variable overrides
//! 3. Configuration file
//! 4. Built-in defaults

use std::path::Path;

use anyhow::{Context, Result};

use super::{defaults, paths, schema::Config};

pub const LISTEN_ENV: &str = "CROSSGRAPH_LISTEN";
pub const EVENTS_TARGET_ENV: &str = "CROSSGRAPH_GLOBAL_EVENTS_TARGET";
pub const EVENTS_CAP_ENV: &str = "CROSSGRAPH_GLOBAL_EVENTS_CAP";
pub const REQUEST_TIMEOUT_ENV: &str = "CROSSGRAPH_REQUEST_TIMEOUT_SECS";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the root configuration file, if any, with environment overrides
    /// applied.
    pub fn load() -> Result<Config> {
        let config = Self::load_root()?;
        Self::apply_env_overrides(config, |key| std::env::var(key).ok())
    }

    /// Load the root configuration file, or the defaults when it does not
    /// exist.
    pub fn load_root() -> Result<Config> {
        let path = paths::root_config_path();
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::load_defaults());
        }
        Self::load_file(&path)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration file and the merged result.
    ///
    /// Fails on invalid YAML, unknown keys, values of the wrong type and
    /// values out of range.
    pub fn validate() -> Result<Config> {
        let config = Self::load().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides, reading variables through
    /// `lookup`. Unparseable numbers are an error.
    pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(listen) = lookup(LISTEN_ENV) {
            config.server.listen = listen;
        }

        if let Some(target) = lookup(EVENTS_TARGET_ENV) {
            config.events.global_events_target = target
                .parse()
                .with_context(|| format!("{} must be a number", EVENTS_TARGET_ENV))?;
        }

        if let Some(cap) = lookup(EVENTS_CAP_ENV) {
            config.events.global_events_cap = cap
                .parse()
                .with_context(|| format!("{} must be a number", EVENTS_CAP_ENV))?;
        }

        if let Some(timeout) = lookup(REQUEST_TIMEOUT_ENV) {
            config.kubernetes.request_timeout_secs = timeout
                .parse()
                .with_context(|| format!("{} must be a number", REQUEST_TIMEOUT_ENV))?;
        }

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.events.global_events_cap, 1000);
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::apply_env_overrides(
            Config::default(),
            env(&[
                (LISTEN_ENV, "0.0.0.0:80"),
                (EVENTS_CAP_ENV, "20"),
                (REQUEST_TIMEOUT_ENV, "30"),
            ]),
        )
        .unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:80");
        assert_eq!(config.events.global_events_cap, 20);
        assert_eq!(config.events.global_events_target, 500);
        assert_eq!(config.kubernetes.request_timeout_secs, 30);
    }

    #[test]
    fn test_env_override_must_parse() {
        let overrides = env(&[(EVENTS_TARGET_ENV, "many")]);
        let result = ConfigLoader::apply_env_overrides(Config::default(), overrides);
        assert!(result.is_err());
    }
}
