//! Unified error types for sitecfg.
//!
//! Every failure that crosses a crate boundary is expressed as [`Error`]. The
//! type is `Clone` so a single in-flight load can hand the same failure to
//! every caller waiting on it.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the sitecfg subsystem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty tenant id).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The tenant's parent document (or another required document) is absent.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// A single remote fetch exceeded its deadline.
    #[error("FETCH_TIMEOUT: {0}")]
    Timeout(String),

    /// Any other backend failure.
    #[error("REMOTE_STORE_ERROR: {0}")]
    RemoteStore(String),

    /// A remote record could not be decoded into its typed form.
    #[error("DECODE_FAILED: {0}")]
    Decode(String),

    /// No fresh cache entry exists for the requested key.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// A section could not be written to the rendering layer.
    #[error("RENDER_FAILED: {0}")]
    Render(String),
}

impl Error {
    /// Whether the assembler may retry the failed fetch.
    ///
    /// Only timeouts are retried; a missing tenant or a backend failure is
    /// surfaced immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::NotFound(msg) => (-32001, msg.clone()),
            Error::Timeout(msg) => (-32006, msg.clone()),
            Error::RemoteStore(msg) => (-32008, msg.clone()),
            Error::Decode(msg) => (-32000, msg.clone()),
            Error::CacheMiss(msg) => (-32002, msg.clone()),
            Error::Render(msg) => (-32012, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("configuracoes/acme".to_string());
        assert!(err.to_string().contains("NOT_FOUND"));
        assert!(err.to_string().contains("configuracoes/acme"));
    }

    #[test]
    fn test_only_timeouts_are_retryable() {
        assert!(Error::Timeout("cores".into()).is_retryable());
        assert!(!Error::NotFound("acme".into()).is_retryable());
        assert!(!Error::RemoteStore("permission denied".into()).is_retryable());
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::CacheMiss("produtos:acme".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32002);

        let err = Error::Timeout("contato".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32006);
    }

    #[test]
    fn test_decode_from_serde() {
        let err: Error = serde_json::from_str::<u32>("\"nope\"").unwrap_err().into();
        assert!(matches!(err, Error::Decode(_)));
    }
}
