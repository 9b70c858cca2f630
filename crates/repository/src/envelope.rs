use serde::Serialize;

use crate::{RepositoryError, Result};

/// Result of a repository read or write.
///
/// `data` is None for count-only reads. `total` is the number of matching
/// rows, or 1 for a single-record cache hit and the list length for a
/// list cache hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub total: i64,
}

impl<T> Envelope<T> {
    pub fn found(data: T, total: i64) -> Self {
        Self {
            data: Some(data),
            total,
        }
    }

    pub fn counted(total: i64) -> Self {
        Self { data: None, total }
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Returns the record, treating a count-only envelope as not found.
    pub fn require(self, entity: &'static str, lookup: impl std::fmt::Display) -> Result<T> {
        self.data
            .ok_or_else(|| -> RepositoryError { crate::not_found!(entity, lookup) })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            data: self.data.map(f),
            total: self.total,
        }
    }
}
