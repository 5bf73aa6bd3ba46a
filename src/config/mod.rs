//! Configuration system for crossgraph
//!
//! A YAML file in the platform configuration directory, layered over
//! built-in defaults and under environment overrides and command-line flags.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

use anyhow::Context;

pub use defaults::template;
pub use loader::ConfigLoader;
pub use schema::Config;

/// Every key `config get` and `config set` accept
pub const KEYS: &[&str] = &[
    "server.listen",
    "server.playground",
    "events.globalEventsTarget",
    "events.globalEventsCap",
    "kubernetes.requestTimeoutSecs",
    "kubernetes.retry.maxAttempts",
    "kubernetes.retry.initialBackoffMillis",
    "kubernetes.retry.maxBackoffMillis",
    "kubernetes.retry.multiplier",
];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    let retry = &config.kubernetes.retry;
    match key {
        "server.listen" => Ok(config.server.listen.clone()),
        "server.playground" => Ok(config.server.playground.to_string()),
        "events.globalEventsTarget" => Ok(config.events.global_events_target.to_string()),
        "events.globalEventsCap" => Ok(config.events.global_events_cap.to_string()),
        "kubernetes.requestTimeoutSecs" => Ok(config.kubernetes.request_timeout_secs.to_string()),
        "kubernetes.retry.maxAttempts" => Ok(retry.max_attempts.to_string()),
        "kubernetes.retry.initialBackoffMillis" => Ok(retry.initial_backoff_millis.to_string()),
        "kubernetes.retry.maxBackoffMillis" => Ok(retry.max_backoff_millis.to_string()),
        "kubernetes.retry.multiplier" => Ok(retry.multiplier.to_string()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    let retry = &mut config.kubernetes.retry;
    match key {
        "server.listen" => {
            config.server.listen = value.to_string();
        }
        "server.playground" => {
            config.server.playground = value
                .parse()
                .context("server.playground must be 'true' or 'false'")?;
        }
        "events.globalEventsTarget" => {
            config.events.global_events_target = value
                .parse()
                .context("events.globalEventsTarget must be a number")?;
        }
        "events.globalEventsCap" => {
            config.events.global_events_cap = value
                .parse()
                .context("events.globalEventsCap must be a number")?;
        }
        "kubernetes.requestTimeoutSecs" => {
            config.kubernetes.request_timeout_secs = value
                .parse()
                .context("kubernetes.requestTimeoutSecs must be a number")?;
        }
        "kubernetes.retry.maxAttempts" => {
            retry.max_attempts = value
                .parse()
                .context("kubernetes.retry.maxAttempts must be a number")?;
        }
        "kubernetes.retry.initialBackoffMillis" => {
            retry.initial_backoff_millis = value
                .parse()
                .context("kubernetes.retry.initialBackoffMillis must be a number")?;
        }
        "kubernetes.retry.maxBackoffMillis" => {
            retry.max_backoff_millis = value
                .parse()
                .context("kubernetes.retry.maxBackoffMillis must be a number")?;
        }
        "kubernetes.retry.multiplier" => {
            retry.multiplier = value
                .parse()
                .context("kubernetes.retry.multiplier must be a number")?;
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
