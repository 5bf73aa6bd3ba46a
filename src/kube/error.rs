//! Object client errors
//!
//! Every failure coming back from the object store is folded into a
//! [`ClientError`] so resolvers and the write retry policy can reason about
//! it without knowing which transport produced it.

/// Error returned by an [`ObjectClient`](super::ObjectClient) call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("server timeout: {0}")]
    ServerTimeout(String),

    #[error("internal error: {0}")]
    InternalError(String),

    #[error("too many requests: {0}")]
    TooManyRequests(String),

    #[error("unknown error: {0}")]
    Unknown(String),

    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Classify an API status by its reason, falling back to the HTTP code
    /// when the server did not send a recognised reason.
    pub fn from_status(code: u16, reason: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match reason {
            "NotFound" => ClientError::NotFound(message),
            "Conflict" | "AlreadyExists" => ClientError::Conflict(message),
            "Timeout" => ClientError::Timeout(message),
            "ServerTimeout" => ClientError::ServerTimeout(message),
            "InternalError" => ClientError::InternalError(message),
            "TooManyRequests" => ClientError::TooManyRequests(message),
            "" | "Unknown" => match code {
                404 => ClientError::NotFound(message),
                409 => ClientError::Conflict(message),
                429 => ClientError::TooManyRequests(message),
                504 => ClientError::Timeout(message),
                _ => ClientError::Unknown(message),
            },
            _ => ClientError::Other(message),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// Whether a write that failed with this error may succeed if retried.
    ///
    /// Opaque errors count as retriable: transport failures and statuses the
    /// server could not explain usually clear up on their own.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout(_)
                | ClientError::ServerTimeout(_)
                | ClientError::InternalError(_)
                | ClientError::TooManyRequests(_)
                | ClientError::Unknown(_)
        )
    }
}

impl From<kube::Error> for ClientError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(status) => {
                ClientError::from_status(status.code, &status.reason, status.message.clone())
            }
            kube::Error::SerdeError(e) => {
                ClientError::Other(format!("cannot decode object: {}", e))
            }
            other => ClientError::Unknown(other.to_string()),
        }
    }
}

impl From<tokio::time::error::Elapsed> for ClientError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        ClientError::Timeout("deadline exceeded".to_string())
    }
}
