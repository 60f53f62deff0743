//! Error types for the rankboard library.

use thiserror::Error;

use super::ids::PostId;

/// All errors that can occur in the rankboard library.
#[derive(Error, Debug)]
pub enum BoardError {
    /// A post was scored before being attached to a live event.
    #[error("Post has no event context; score is undefined")]
    MissingEventContext,

    /// Advisory validation failed. The message is meant for end users.
    #[error("{0}")]
    Validation(String),

    /// Post not found by ID.
    #[error("Post {0} not found")]
    PostNotFound(PostId),

    /// Attribute name is not part of the entity.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Attribute exists but may not be set from outside.
    #[error("Attribute is read-only: {0}")]
    ReadOnlyAttribute(String),

    /// Attribute value has the wrong shape.
    #[error("Invalid value for attribute {name}: {reason}")]
    InvalidAttribute { name: String, reason: String },

    /// Chat expiry needs a tokio runtime to arm its timer.
    #[error("No tokio runtime available to schedule chat expiry")]
    NoRuntime,

    /// Snapshot (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for rankboard operations.
pub type BoardResult<T> = Result<T, BoardError>;
