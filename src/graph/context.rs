//! Per-field session
//!
//! Resolvers that do I/O open a [`Session`]: it builds a client for the
//! request's credentials and runs every call against one deadline, so a
//! slow API server surfaces as an ordinary fetch error on that field.

use std::sync::Arc;
use std::time::Duration;

use async_graphql::Context;
use kube::core::{DynamicObject, GroupVersionKind};
use tokio::time::{Instant, timeout_at};

use super::errors::{FieldError, record};
use crate::events::EventLimits;
use crate::kube::{
    ClientError, ClientFactory, Credentials, ObjectClient, ObjectKey, RetryPolicy, with_backoff,
};
use crate::models::{FromObject, KnownKind, ObjectReference};

/// Longest deadline a single field may run under
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(3600);

/// Settings every resolver can read from the schema data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub events: EventLimits,
    /// Deadline for the I/O of a single field
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            events: EventLimits::default(),
            request_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// A write a mutation performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl WriteOp {
    fn verb(&self) -> &'static str {
        match self {
            WriteOp::Create => "create",
            WriteOp::Update => "update",
            WriteOp::Delete => "delete",
        }
    }
}

pub struct Session {
    client: Arc<dyn ObjectClient>,
    settings: Settings,
    deadline: Instant,
}

impl Session {
    /// Acquire a client for the request's credentials.
    pub async fn acquire(ctx: &Context<'_>) -> Result<Self, FieldError> {
        let settings = ctx.data_opt::<Settings>().copied().unwrap_or_default();
        let factory = ctx
            .data::<Arc<dyn ClientFactory>>()
            .map_err(|e| FieldError::ClientAcquisition(ClientError::Other(e.message)))?;
        let credentials = ctx.data_opt::<Credentials>().cloned().unwrap_or_default();
        let deadline = Instant::now()
            .checked_add(settings.request_timeout.min(MAX_REQUEST_TIMEOUT))
            .ok_or_else(|| {
                FieldError::ClientAcquisition(ClientError::Other(
                    "request deadline out of range".to_string(),
                ))
            })?;

        let client = timeout_at(deadline, factory.client(&credentials))
            .await
            .map_err(|e| FieldError::ClientAcquisition(e.into()))?
            .map_err(FieldError::ClientAcquisition)?;

        Ok(Self {
            client,
            settings,
            deadline,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn get(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
    ) -> Result<DynamicObject, FieldError> {
        self.get_raw(gvk, key)
            .await
            .map_err(|e| FieldError::fetch(format!("get {} {}", gvk.kind, key), e))
    }

    /// Get an object, treating not found as absent.
    pub async fn get_opt(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
    ) -> Result<Option<DynamicObject>, FieldError> {
        match self.get_raw(gvk, key).await {
            Ok(object) => Ok(Some(object)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(FieldError::fetch(format!("get {} {}", gvk.kind, key), e)),
        }
    }

    pub async fn get_ref(&self, reference: &ObjectReference) -> Result<DynamicObject, FieldError> {
        self.get(&reference.gvk(), &reference.key()).await
    }

    async fn get_raw(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
    ) -> Result<DynamicObject, ClientError> {
        timeout_at(self.deadline, self.client.get(gvk, key)).await?
    }

    pub async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<String>,
    ) -> Result<Vec<DynamicObject>, FieldError> {
        let action = match &namespace {
            Some(ns) => format!("list {} in {}", gvk.kind, ns),
            None => format!("list {}", gvk.kind),
        };
        timeout_at(self.deadline, self.client.list(gvk, namespace))
            .await
            .map_err(ClientError::from)
            .and_then(|r| r)
            .map_err(|e| FieldError::fetch(action, e))
    }

    /// List every object of a known kind and model each one. Objects that
    /// fail to model are recorded and skipped.
    pub async fn list_models<T: FromObject>(
        &self,
        ctx: &Context<'_>,
        kind: KnownKind,
    ) -> Result<Vec<T>, FieldError> {
        let objects = self.list(&kind.gvk(), None).await?;
        Ok(model_each(ctx, objects))
    }

    /// Run a write with the configured retry policy.
    pub async fn write(
        &self,
        op: WriteOp,
        object: &DynamicObject,
    ) -> Result<Option<DynamicObject>, FieldError> {
        let client = &self.client;
        let policy = &self.settings.retry;
        let name = object.metadata.name.clone().unwrap_or_default();
        let action = format!("{} {}", op.verb(), name);

        let attempt = async {
            match op {
                WriteOp::Create => with_backoff(policy, || client.create(object)).await.map(Some),
                WriteOp::Update => with_backoff(policy, || client.update(object)).await.map(Some),
                WriteOp::Delete => match with_backoff(policy, || client.delete(object)).await {
                    Ok(()) => Ok(None),
                    Err(e) if e.is_not_found() => {
                        tracing::debug!("{} was already gone", name);
                        Ok(None)
                    }
                    Err(e) => Err(e),
                },
            }
        };

        timeout_at(self.deadline, attempt)
            .await
            .map_err(ClientError::from)
            .and_then(|r| r)
            .map_err(|e| FieldError::write(action, e))
    }
}

/// Model a batch of objects, recording and skipping failures.
pub fn model_each<T: FromObject>(ctx: &Context<'_>, objects: Vec<DynamicObject>) -> Vec<T> {
    objects
        .into_iter()
        .filter_map(|object| match T::from_object(object) {
            Ok(model) => Some(model),
            Err(e) => {
                record(ctx, e.into());
                None
            }
        })
        .collect()
}
