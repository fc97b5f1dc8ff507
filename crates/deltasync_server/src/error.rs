//! Error types for the delta server.

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the delta server.
///
/// Negotiation itself never fails on bad client input; these are encoding
/// and infrastructure faults only.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Document or patch could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A response header value could not be constructed.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderValue),

    /// I/O error (bind, accept).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_failure_is_io() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use");
        let err = ServerError::from(io);
        assert!(matches!(err, ServerError::Io(_)));
        assert_eq!(err.to_string(), "io error: in use");
    }

    #[test]
    fn error_display() {
        let err = serde_json::from_str::<u8>("x").unwrap_err();
        let msg = ServerError::from(err).to_string();
        assert!(msg.starts_with("serialization error"));
    }
}
