//! Aggregator error types.

use cache::CacheError;
use common::{ErrorKind, ErrorLog, error_log};
use repository::RepositoryError;
use thiserror::Error;

/// Errors that can occur while assembling a composite view.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// A sub-lookup failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A lookup task panicked or was cancelled.
    #[error("Lookup task failed: {source}")]
    Join {
        source: tokio::task::JoinError,
        log: ErrorLog,
    },

    #[error("Cache error: {source}")]
    Cache { source: CacheError, log: ErrorLog },

    #[error("Serialization error: {source}")]
    Serialization {
        source: serde_json::Error,
        log: ErrorLog,
    },
}

impl AggregateError {
    pub(crate) fn join(source: tokio::task::JoinError) -> Self {
        AggregateError::Join {
            log: error_log!(ErrorKind::Internal, "lookup task failed: {source}"),
            source,
        }
    }

    pub(crate) fn cache(source: CacheError) -> Self {
        AggregateError::Cache {
            log: error_log!(ErrorKind::Internal, "{source}"),
            source,
        }
    }

    pub(crate) fn serialization(source: serde_json::Error) -> Self {
        AggregateError::Serialization {
            log: error_log!(ErrorKind::Internal, "{source}"),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.log().kind
    }

    pub fn log(&self) -> &ErrorLog {
        match self {
            AggregateError::Repository(e) => e.log(),
            AggregateError::Join { log, .. }
            | AggregateError::Cache { log, .. }
            | AggregateError::Serialization { log, .. } => log,
        }
    }
}

/// Result type for aggregator operations.
pub type Result<T> = std::result::Result<T, AggregateError>;
