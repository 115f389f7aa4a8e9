//! Error types for the realtime chat service.

use clubhouse_database::StorageError;
use thiserror::Error;

/// Result type alias for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Failures reported back to a single connection as an `error` frame.
///
/// Every variant is recoverable at the connection level: the offending
/// connection stays open and may continue sending valid frames. The
/// display string is exactly what the client sees.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Join addressed to a space id that does not exist.
    #[error("Chat space not found")]
    SpaceNotFound,

    /// Post whose author or space could not be resolved.
    #[error("Invalid user or chat space")]
    UnknownUserOrSpace,

    /// Private-space access check failed, or the connection posted outside
    /// the space it joined.
    #[error("{reason}")]
    AccessDenied { reason: String },

    /// Malformed JSON or missing required fields at the frame boundary.
    #[error("Invalid message format")]
    InvalidPayload,

    /// The storage collaborator failed; nothing was broadcast.
    #[error("Failed to save message")]
    Persistence(#[from] StorageError),
}

impl ChatError {
    /// Create an access denied error with a client-facing reason
    pub fn access_denied(reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            reason: reason.into(),
        }
    }
}
