//! Error types for the API crate.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use finboard_core::errors::ValidationError;
use finboard_core::models::EntityId;
use serde::Deserialize;
use thiserror::Error;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Underlying error kept by a [`TransportError`]. Shared so the error stays
/// `Clone`.
pub type TransportCause = Arc<dyn StdError + Send + Sync>;

/// Failures below HTTP: no response was received.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out after {}ms", after.as_millis())]
    Timeout { after: Duration },

    #[error("connection failed: {0}")]
    Connect(#[source] TransportCause),

    #[error("{0}")]
    Io(#[source] TransportCause),
}

impl TransportError {
    /// Connection-level failure. Accepts any error, or a plain message.
    pub fn connect(cause: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Connect(Arc::from(cause.into()))
    }

    /// Any other failure while sending or reading the request.
    pub fn io(cause: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Io(Arc::from(cause.into()))
    }

    /// The error reported by the HTTP stack, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            TransportError::Timeout { .. } => None,
            TransportError::Connect(cause) | TransportError::Io(cause) => Some(cause.as_ref()),
        }
    }
}

/// Uniform error surfaced by every service call.
///
/// `Clone` so that callers sharing one in-flight request all observe the
/// same error.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No response received (timeout, DNS, refused connection).
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        cause: TransportError,
    },

    /// Response received with a non-2xx status.
    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    /// 404 on a single-record fetch.
    #[error("{resource} {id} not found: {message}")]
    NotFound {
        resource: &'static str,
        id: EntityId,
        message: String,
    },

    /// 2xx response whose body did not match the expected shape.
    #[error("Failed to parse response ({status}): {message}")]
    Decode { status: u16, message: String },

    /// The request could not be built (bad header, bad configuration).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Payload rejected before any network call.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Error body shape used by the API. Either field may carry the message.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiError {
    /// Create an HTTP error from status and message
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub(crate) fn network(cause: TransportError) -> Self {
        Self::Network {
            message: cause.to_string(),
            cause,
        }
    }

    /// Builds an error from a non-2xx response, preferring the server's
    /// `message` (or `error`) field over a generic description.
    pub(crate) fn from_response(status: u16, body: &[u8]) -> Self {
        let server_message = serde_json::from_slice::<ApiErrorResponse>(body)
            .ok()
            .and_then(|e| e.message.or(e.error))
            .filter(|m| !m.trim().is_empty());

        let message = server_message.unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Request failed with status {}", status))
        });
        Self::http(status, message)
    }

    /// Turns a 404 into [`ApiError::NotFound`] for the given record.
    pub(crate) fn for_record(self, resource: &'static str, id: EntityId) -> Self {
        match self {
            ApiError::Http { status: 404, message } => ApiError::NotFound {
                resource,
                id,
                message,
            },
            other => other,
        }
    }

    /// HTTP status of the failure, or 0 when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Http { status, .. } | ApiError::Decode { status, .. } => *status,
            ApiError::NotFound { .. } => 404,
            ApiError::Network { .. } | ApiError::InvalidRequest(_) | ApiError::Validation(_) => 0,
        }
    }

    /// Human-readable message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            ApiError::Network { message, .. }
            | ApiError::Http { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Decode { message, .. }
            | ApiError::InvalidRequest(message) => message.clone(),
            ApiError::Validation(e) => e.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == 404
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == 401
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ApiError::Network {
                cause: TransportError::Timeout { .. },
                ..
            }
        )
    }
}
