//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server. The server process infers
//! one base configuration at startup; every GraphQL request then gets its own
//! client built from that base and the caller's credentials.
//!
//! HTTP/HTTPS proxies are honoured through the standard `HTTP_PROXY`,
//! `HTTPS_PROXY` and `NO_PROXY` environment variables.

pub mod client;
pub mod error;
pub mod factory;
pub mod retry;

use anyhow::{Context, Result};

pub use client::{KubeObjectClient, ObjectClient, ObjectKey, gvk_of};
pub use error::ClientError;
pub use factory::{ClientFactory, Credentials, KubeClientFactory};
pub use retry::{RetryPolicy, with_backoff};

#[cfg(test)]
pub use client::MockObjectClient;
#[cfg(test)]
pub use factory::MockClientFactory;

/// Infer the base client configuration
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn infer_config() -> Result<kube::Config> {
    let config = kube::Config::infer()
        .await
        .context("Failed to infer Kubernetes configuration")?;
    tracing::debug!("Using API server at {}", config.cluster_url);
    Ok(config)
}

/// Build the factory the server hands to every request.
pub async fn create_factory() -> Result<KubeClientFactory> {
    Ok(KubeClientFactory::new(infer_config().await?))
}
