//! Error types for the DodoIS client.
//!
//! # Design
//! Local failures (missing scopes, bad arguments, incomplete sessions) are
//! raised before any request leaves the process. Every non-2xx response,
//! including the synthetic statuses a `Transport` produces for network
//! failures, lands in `Http` with the raw status and body.

use thiserror::Error;

/// Boxed error returned by caller-supplied session stores.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The session lacks scopes the operation requires.
    #[error("user session is missing required scopes: {}", .missing.join(", "))]
    MissingScopes { missing: Vec<String> },

    /// An argument failed local validation.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The session does not hold a value the operation needs.
    #[error("user session has no {0}")]
    MissingSessionField(&'static str),

    /// DodoIS (or the transport on its behalf) returned a non-2xx status.
    #[error("DodoIS responded with HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// A 2xx body could not be decoded into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The caller's session store failed.
    #[error("session store failed: {0}")]
    SessionStore(#[source] BoxError),
}

impl ApiError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ApiError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// HTTP status for remote errors, `None` for local ones.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the error was raised before any network call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ApiError::MissingScopes { .. }
                | ApiError::InvalidArgument { .. }
                | ApiError::MissingSessionField(_)
        )
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Deserialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
