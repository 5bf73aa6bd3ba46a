//! Resolver errors
//!
//! A failing field never fails the whole response. The error is recorded
//! against the field's path with an `extensions.code`, and the field
//! resolves to its zero value.

use async_graphql::{Context, ErrorExtensions};

use crate::fieldpath::FieldPathError;
use crate::kube::ClientError;
use crate::models::{ModelingError, ReferenceIdError};

#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("cannot get client: {0}")]
    ClientAcquisition(#[source] ClientError),

    #[error("cannot {action}: {source}")]
    Fetch {
        action: String,
        #[source]
        source: ClientError,
    },

    #[error(transparent)]
    Modeling(#[from] ModelingError),

    #[error("cannot {action}: {source}")]
    Write {
        action: String,
        #[source]
        source: ClientError,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl FieldError {
    pub fn fetch(action: impl Into<String>, source: ClientError) -> Self {
        FieldError::Fetch {
            action: action.into(),
            source,
        }
    }

    pub fn write(action: impl Into<String>, source: ClientError) -> Self {
        FieldError::Write {
            action: action.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FieldError::ClientAcquisition(_) => "CLIENT_ACQUISITION",
            FieldError::Fetch { .. } => "FETCH",
            FieldError::Modeling(_) => "MODELING",
            FieldError::Write { .. } => "WRITE",
            FieldError::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    /// Whether a failed write gave up on an error that retrying could clear.
    pub fn is_retriable(&self) -> bool {
        match self {
            FieldError::Write { source, .. } => source.is_retriable(),
            _ => false,
        }
    }

    pub fn into_graphql(self) -> async_graphql::Error {
        let code = self.code();
        let retriable = matches!(self, FieldError::Write { .. }).then(|| self.is_retriable());
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", code.to_string());
            if let Some(retriable) = retriable {
                e.set("retriable", retriable);
            }
        })
    }
}

impl From<ReferenceIdError> for FieldError {
    fn from(e: ReferenceIdError) -> Self {
        FieldError::InvalidInput(format!("bad id: {}", e))
    }
}

impl From<FieldPathError> for FieldError {
    fn from(e: FieldPathError) -> Self {
        FieldError::InvalidInput(format!("bad patch: {}", e))
    }
}

/// Record `err` against the field being resolved.
pub fn record(ctx: &Context<'_>, err: FieldError) {
    tracing::warn!("Field resolution failed ({}): {}", err.code(), err);
    let error = err.into_graphql().into_server_error(ctx.item.pos);
    ctx.add_error(ctx.set_error_path(error));
}

/// Unwrap a field result, recording the error and falling back to the
/// zero value.
pub fn recover<T: Default>(ctx: &Context<'_>, result: Result<T, FieldError>) -> T {
    result.unwrap_or_else(|err| {
        record(ctx, err);
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            FieldError::ClientAcquisition(ClientError::Other("x".into())).code(),
            "CLIENT_ACQUISITION"
        );
        assert_eq!(
            FieldError::fetch("list providers", ClientError::Timeout("x".into())).code(),
            "FETCH"
        );
        assert_eq!(FieldError::InvalidInput("x".into()).code(), "INVALID_INPUT");
    }

    #[test]
    fn test_write_retriable_flag() {
        let exhausted =
            FieldError::write("create object", ClientError::TooManyRequests("x".into()));
        assert!(exhausted.is_retriable());
        let terminal = FieldError::write("create object", ClientError::Conflict("x".into()));
        assert!(!terminal.is_retriable());
        assert!(!FieldError::InvalidInput("x".into()).is_retriable());
    }

    #[test]
    fn test_messages() {
        let err =
            FieldError::fetch("get secret default/creds", ClientError::NotFound("creds".into()));
        assert_eq!(err.to_string(), "cannot get secret default/creds: not found: creds");
        let err: FieldError = ReferenceIdError::Parts(2).into();
        assert!(err.to_string().starts_with("invalid input: bad id"));
    }
}
