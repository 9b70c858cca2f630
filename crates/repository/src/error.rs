use cache::CacheError;
use common::{ErrorKind, ErrorLog};
use journey::JourneyError;
use thiserror::Error;

/// Errors raised by a relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),
}

/// Errors returned by entity repositories.
///
/// Every variant carries the [`ErrorLog`] emitted when it was raised.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} not found: {lookup}")]
    NotFound {
        entity: &'static str,
        lookup: String,
        log: ErrorLog,
    },

    #[error("Store error: {source}")]
    Store { source: StoreError, log: ErrorLog },

    #[error("Cache error: {source}")]
    Cache { source: CacheError, log: ErrorLog },

    #[error("Serialization error: {source}")]
    Serialization {
        source: serde_json::Error,
        log: ErrorLog,
    },

    #[error("Journey log error: {source}")]
    Journey { source: JourneyError, log: ErrorLog },
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        self.log().kind
    }

    pub fn log(&self) -> &ErrorLog {
        match self {
            RepositoryError::NotFound { log, .. }
            | RepositoryError::Store { log, .. }
            | RepositoryError::Cache { log, .. }
            | RepositoryError::Serialization { log, .. }
            | RepositoryError::Journey { log, .. } => log,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Result type for relational store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Builds a `RepositoryError::NotFound`, logging it at the call site.
#[macro_export]
macro_rules! not_found {
    ($entity:expr, $lookup:expr) => {{
        let lookup = ($lookup).to_string();
        $crate::RepositoryError::NotFound {
            entity: $entity,
            log: $crate::__common::error_log!(
                $crate::__common::ErrorKind::NotFound,
                "{} not found: {}",
                $entity,
                lookup
            ),
            lookup,
        }
    }};
}

/// Wraps a lower-level failure as an internal `RepositoryError` variant,
/// logging it at the call site.
#[macro_export]
macro_rules! internal {
    ($variant:ident, $source:expr) => {{
        let source = $source;
        $crate::RepositoryError::$variant {
            log: $crate::__common::error_log!(
                $crate::__common::ErrorKind::Internal,
                "{}",
                source
            ),
            source,
        }
    }};
}
