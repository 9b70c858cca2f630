//! Use-case error types.

use common::{EntityId, ErrorKind, ErrorLog, error_log};
use domain::DomainError;
use repository::RepositoryError;
use thiserror::Error;

/// Errors that can occur while running a use case.
#[derive(Debug, Error)]
pub enum UseCaseError {
    /// A status rule was violated.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A repository read or write failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The order is in a terminal status and accepts no further work.
    #[error("{entity} {id} is {status}")]
    OrderClosed {
        entity: &'static str,
        id: EntityId,
        status: String,
        log: ErrorLog,
    },
}

impl UseCaseError {
    pub fn order_closed(entity: &'static str, id: EntityId, status: &str) -> Self {
        UseCaseError::OrderClosed {
            entity,
            id,
            status: status.to_string(),
            log: error_log!(ErrorKind::Conflict, "{entity} {id} is {status}"),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.log().kind
    }

    pub fn log(&self) -> &ErrorLog {
        match self {
            UseCaseError::Domain(e) => e.log(),
            UseCaseError::Repository(e) => e.log(),
            UseCaseError::OrderClosed { log, .. } => log,
        }
    }
}

/// Result type for use-case operations.
pub type Result<T> = std::result::Result<T, UseCaseError>;
