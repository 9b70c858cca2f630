//! Domain error types.

use common::{ErrorKind, ErrorLog, error_log};
use repository::RepositoryError;
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A repository read or write failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The requested status change is not permitted.
    #[error("{order_type} cannot move from {from} to {to}")]
    InvalidTransition {
        order_type: String,
        from: String,
        to: String,
        log: ErrorLog,
    },

    /// A status belongs to a different workflow than the order.
    #[error("status {status} is not a {order_type} status")]
    ForeignStatus {
        order_type: String,
        status: String,
        log: ErrorLog,
    },
}

impl DomainError {
    pub fn invalid_transition(order_type: &str, from: &str, to: &str) -> Self {
        DomainError::InvalidTransition {
            order_type: order_type.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            log: error_log!(
                ErrorKind::Conflict,
                "{order_type} cannot move from {from} to {to}"
            ),
        }
    }

    pub fn foreign_status(order_type: &str, status: &str) -> Self {
        DomainError::ForeignStatus {
            order_type: order_type.to_string(),
            status: status.to_string(),
            log: error_log!(
                ErrorKind::Unprocessable,
                "status {status} is not a {order_type} status"
            ),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.log().kind
    }

    pub fn log(&self) -> &ErrorLog {
        match self {
            DomainError::Repository(e) => e.log(),
            DomainError::InvalidTransition { log, .. } | DomainError::ForeignStatus { log, .. } => {
                log
            }
        }
    }
}
