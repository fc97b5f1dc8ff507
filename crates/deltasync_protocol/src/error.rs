//! Error types for patch validation.

use thiserror::Error;

/// Result type for patch operations.
pub type PatchResult<T> = Result<T, PatchError>;

/// Errors raised while validating or applying a patch.
///
/// Each variant carries the offending path so the consumer can log a
/// descriptive failure before deciding whether to request a full document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// Path does not have exactly three segments.
    #[error("unsupported patch path '{path}': expected 3 segments, got {segments}")]
    PathDepth {
        /// The path as received.
        path: String,
        /// Number of segments found.
        segments: usize,
    },

    /// Path does not start with `/`.
    #[error("unsupported patch path '{0}': must start with '/'")]
    NotAbsolute(String),

    /// A segment does not name a known branch or leaf.
    #[error("unsupported patch path '{path}': unknown segment '{segment}'")]
    UnknownSegment {
        /// The unrecognized segment.
        segment: String,
        /// The full path.
        path: String,
    },

    /// The value is not representable as a signed 64-bit integer.
    #[error("unsupported value for path '{path}': {value}")]
    UnsupportedValue {
        /// Path the value was destined for.
        path: String,
        /// The value as received.
        value: String,
    },
}
