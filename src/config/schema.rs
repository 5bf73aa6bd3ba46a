//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::events::EventLimits;
use crate::graph::Settings;
use crate::graph::context::MAX_REQUEST_TIMEOUT;
use crate::kube::RetryPolicy;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Cluster-wide event feed limits
    #[serde(default)]
    pub events: EventsConfig,

    /// API server access
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to listen on
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Serve GraphiQL at `/`
    #[serde(default = "default_true")]
    pub playground: bool,
}

/// Limits of the cluster-wide event feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EventsConfig {
    /// Stop collecting once this many warnings are in the feed
    #[serde(default = "default_events_target")]
    pub global_events_target: usize,

    /// Never return more events than this
    #[serde(default = "default_events_cap")]
    pub global_events_cap: usize,
}

/// API server access
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KubernetesConfig {
    /// Deadline for the API calls of a single field
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retry of failed writes
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Backoff for writes that fail with a retriable error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff_millis")]
    pub initial_backoff_millis: u64,

    #[serde(default = "default_max_backoff_millis")]
    pub max_backoff_millis: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

// Default value functions
fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_true() -> bool {
    true
}

fn default_events_target() -> usize {
    500
}

fn default_events_cap() -> usize {
    1000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_backoff_millis() -> u64 {
    100
}

fn default_max_backoff_millis() -> u64 {
    2000
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            playground: default_true(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            global_events_target: default_events_target(),
            global_events_cap: default_events_cap(),
        }
    }
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_millis: default_initial_backoff_millis(),
            max_backoff_millis: default_max_backoff_millis(),
            multiplier: default_multiplier(),
        }
    }
}

impl Config {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.server
            .listen
            .parse()
            .with_context(|| {
                format!("server.listen is not a socket address: {}", self.server.listen)
            })
    }

    /// Settings handed to every resolver
    pub fn settings(&self) -> Settings {
        let retry = &self.kubernetes.retry;
        Settings {
            events: EventLimits {
                target: self.events.global_events_target,
                cap: self.events.global_events_cap,
            },
            request_timeout: Duration::from_secs(self.kubernetes.request_timeout_secs),
            retry: RetryPolicy {
                max_attempts: retry.max_attempts,
                initial_backoff: Duration::from_millis(retry.initial_backoff_millis),
                max_backoff: Duration::from_millis(retry.max_backoff_millis),
                multiplier: retry.multiplier,
            },
        }
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.events.global_events_cap == 0 {
            anyhow::bail!("events.globalEventsCap must be at least 1");
        }
        if self.events.global_events_target == 0 {
            anyhow::bail!("events.globalEventsTarget must be at least 1");
        }
        let timeout = self.kubernetes.request_timeout_secs;
        if timeout == 0 || timeout > MAX_REQUEST_TIMEOUT.as_secs() {
            anyhow::bail!(
                "kubernetes.requestTimeoutSecs must be between 1 and {}, got {}",
                MAX_REQUEST_TIMEOUT.as_secs(),
                timeout
            );
        }
        let retry = &self.kubernetes.retry;
        if retry.max_attempts == 0 {
            anyhow::bail!("kubernetes.retry.maxAttempts must be at least 1");
        }
        if retry.multiplier.is_nan() || retry.multiplier < 1.0 {
            anyhow::bail!("kubernetes.retry.multiplier must be at least 1.0");
        }
        if retry.initial_backoff_millis > retry.max_backoff_millis {
            anyhow::bail!(
                "kubernetes.retry.initialBackoffMillis ({}) exceeds maxBackoffMillis ({})",
                retry.initial_backoff_millis,
                retry.max_backoff_millis
            );
        }
        Ok(())
    }
}
