//! Error types for the remote transport crate.

use cajaflow_core::sync::{RemoteError, RemoteErrorKind};
use thiserror::Error;

/// Result type alias for remote transport operations.
pub type Result<T> = std::result::Result<T, RemoteClientError>;

/// SQLSTATE code reported by the server for unique-constraint violations.
const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE code reported by the server for foreign-key violations.
const SQLSTATE_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors that can occur while talking to the remote datastore.
#[derive(Debug, Error)]
pub enum RemoteClientError {
    /// HTTP client error (connect, timeout, body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the remote API
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Invalid request (malformed header value, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl RemoteClientError {
    /// Create an API error from status, server error code and message.
    pub fn api(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code,
            message: message.into(),
        }
    }

    /// Classify into the engine-facing error kind.
    ///
    /// The server error code is the primary discriminator: both duplicate-key
    /// and missing-foreign-key arrive as HTTP 409 from PostgREST-style APIs.
    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            Self::Api { status, code, .. } => match code.as_deref() {
                Some(SQLSTATE_UNIQUE_VIOLATION) => RemoteErrorKind::Duplicate,
                Some(SQLSTATE_FOREIGN_KEY_VIOLATION) => RemoteErrorKind::ForeignKeyViolation,
                _ => match *status {
                    409 => RemoteErrorKind::Duplicate,
                    408 | 425 | 429 => RemoteErrorKind::Transient,
                    500..=599 => RemoteErrorKind::Transient,
                    _ => RemoteErrorKind::Unknown,
                },
            },
            Self::Http(err) => {
                if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
                    RemoteErrorKind::Transient
                } else {
                    RemoteErrorKind::Unknown
                }
            }
            Self::Json(_) => RemoteErrorKind::Unknown,
            Self::InvalidRequest(_) => RemoteErrorKind::Unknown,
        }
    }
}

impl From<RemoteClientError> for RemoteError {
    fn from(err: RemoteClientError) -> Self {
        RemoteError::new(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_code_wins_over_status() {
        let err = RemoteClientError::api(
            409,
            Some("23505".to_string()),
            "duplicate key value violates unique constraint",
        );
        assert_eq!(err.kind(), RemoteErrorKind::Duplicate);
    }

    #[test]
    fn foreign_key_code_is_not_mistaken_for_duplicate() {
        // Same HTTP status as a duplicate; only the code tells them apart.
        let err = RemoteClientError::api(
            409,
            Some("23503".to_string()),
            "violates foreign key constraint",
        );
        assert_eq!(err.kind(), RemoteErrorKind::ForeignKeyViolation);
    }

    #[test]
    fn server_errors_are_transient() {
        let err = RemoteClientError::api(503, None, "service unavailable");
        assert_eq!(err.kind(), RemoteErrorKind::Transient);
    }

    #[test]
    fn client_errors_are_unknown() {
        let err = RemoteClientError::api(400, None, "bad request");
        assert_eq!(err.kind(), RemoteErrorKind::Unknown);
    }

    #[test]
    fn conversion_keeps_the_kind_and_message() {
        let err = RemoteClientError::api(500, None, "boom");
        let remote: RemoteError = err.into();
        assert_eq!(remote.kind, RemoteErrorKind::Transient);
        assert!(remote.message.contains("boom"));
    }
}
