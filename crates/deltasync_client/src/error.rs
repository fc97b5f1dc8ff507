//! Error types for the polling client.

use deltasync_protocol::PatchError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while polling a delta server.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the request can be retried.
        retryable: bool,
    },

    /// The server answered with a 5xx status.
    #[error("server error: status {0}")]
    ServerStatus(u16),

    /// The server answered with a status the client does not handle.
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    /// The response body has a content type the client does not handle.
    #[error("unexpected content type {0:?}")]
    UnexpectedContentType(String),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A received patch does not fit the local document.
    ///
    /// The local baseline has been discarded; the next poll fetches the
    /// full document.
    #[error("patch rejected: {0}")]
    Patch(#[from] PatchError),

    /// Polling was cancelled.
    #[error("polling cancelled")]
    Cancelled,
}

impl ClientError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if the failed poll can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport { retryable, .. } => *retryable,
            ClientError::ServerStatus(_) => true,
            // The replica was reset, so a retry asks for the full document.
            ClientError::Patch(_) => true,
            _ => false,
        }
    }
}
