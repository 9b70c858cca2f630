use thiserror::Error;

use crate::EntityId;

/// Errors that can occur when interacting with the journey log.
#[derive(Debug, Error)]
pub enum JourneyError {
    /// The event is missing data the log requires.
    #[error("Invalid journey event: {0}")]
    InvalidEvent(String),

    /// A status id did not resolve to a canonical status name.
    #[error("Unknown status: {0}")]
    UnknownStatus(EntityId),

    /// The status catalog itself failed.
    #[error("Status lookup failed: {0}")]
    StatusLookup(String),

    /// The backing store is unreachable.
    #[error("Journey log unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for journey log operations.
pub type Result<T> = std::result::Result<T, JourneyError>;
