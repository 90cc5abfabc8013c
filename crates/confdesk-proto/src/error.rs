//! Error types for payload decoding and validation.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtoError`].
pub type Result<T, E = ProtoError> = std::result::Result<T, E>;

/// Errors raised while decoding or validating a payload.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// The body was not valid JSON for the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field was absent or blank.
    #[error("{0} is required")]
    MissingField(&'static str),
}
