//! Per-request client acquisition
//!
//! Each GraphQL request carries the caller's credentials. A [`ClientFactory`]
//! turns them into an [`ObjectClient`] that acts as that caller, so the API
//! server enforces its own authorization for every read and write.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::{KubeObjectClient, ObjectClient};
use super::error::ClientError;

/// Caller identity extracted from an incoming request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Bearer token presented to the API server
    pub token: Option<String>,
    pub impersonate_user: Option<String>,
    pub impersonate_groups: Vec<String>,
}

impl Credentials {
    pub fn is_anonymous(&self) -> bool {
        self.token.is_none() && self.impersonate_user.is_none()
    }
}

/// Produces object clients for a set of credentials
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn client(&self, credentials: &Credentials)
    -> Result<Arc<dyn ObjectClient>, ClientError>;
}

/// Builds kube clients from a base configuration, layering the caller's
/// token and impersonation headers on top.
pub struct KubeClientFactory {
    base: kube::Config,
}

impl KubeClientFactory {
    pub fn new(base: kube::Config) -> Self {
        Self { base }
    }

    /// The base config with its identity removed, carrying only what the
    /// caller presented. Cluster address and CA data are kept.
    fn config_for(&self, credentials: &Credentials) -> kube::Config {
        let mut config = self.base.clone();
        config.auth_info = kube::config::AuthInfo {
            token: credentials.token.clone().map(Into::into),
            ..Default::default()
        };
        if let Some(user) = &credentials.impersonate_user {
            config.auth_info.impersonate = Some(user.clone());
            if !credentials.impersonate_groups.is_empty() {
                config.auth_info.impersonate_groups =
                    Some(credentials.impersonate_groups.clone());
            }
        }
        config
    }
}

#[async_trait]
impl ClientFactory for KubeClientFactory {
    async fn client(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn ObjectClient>, ClientError> {
        if credentials.is_anonymous() {
            tracing::debug!("No credentials on request, acting anonymously");
        }
        let client = kube::Client::try_from(self.config_for(credentials))
            .map_err(|e| ClientError::Other(format!("cannot create client: {}", e)))?;
        Ok(Arc::new(KubeObjectClient::new(client)))
    }
}
