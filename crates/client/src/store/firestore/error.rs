//! Firestore adapter error types.

use std::sync::Arc;

use sitecfg_core::Error;

/// Errors from the Firestore REST adapter.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FirestoreError {
    /// Base URL or document path could not be turned into a URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Missing or rejected credentials, or security rules denied the read.
    #[error("permission denied (status {status})")]
    PermissionDenied { status: u16 },

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response body or typed value could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FirestoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FirestoreError::Timeout } else { FirestoreError::Network(Arc::new(err)) }
    }
}

impl From<FirestoreError> for Error {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::Timeout => Error::Timeout("firestore request timed out".into()),
            FirestoreError::Parse(msg) => Error::Decode(msg),
            FirestoreError::InvalidUrl(msg) => Error::InvalidInput(msg),
            other => Error::RemoteStore(other.to_string()),
        }
    }
}
