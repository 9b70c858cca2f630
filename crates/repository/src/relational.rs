use async_trait::async_trait;
use common::EntityId;

use crate::{ColumnValue, SparseWrite, StoreResult};

/// Equality filter over one table.
///
/// Soft-deleted rows (`deleted_at` set) are excluded unless
/// [`with_deleted`](Filter::with_deleted) is called. Column names are
/// compile-time constants and are rendered into SQL as-is; values are
/// always bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub table: &'static str,
    pub conditions: Vec<(&'static str, ColumnValue)>,
    pub include_deleted: bool,
}

impl Filter {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            conditions: Vec::new(),
            include_deleted: false,
        }
    }

    /// Adds a `column = value` condition.
    pub fn eq(mut self, column: &'static str, value: impl Into<ColumnValue>) -> Self {
        self.conditions.push((column, value.into()));
        self
    }

    /// Includes soft-deleted rows.
    pub fn with_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let conditions = self
            .conditions
            .iter()
            .map(|(c, v)| format!("{c} = {v}"))
            .collect::<Vec<_>>();
        write!(f, "{}", conditions.join(" and "))
    }
}

/// Transactional relational storage.
///
/// Reads run outside any transaction and only see committed rows. Writes
/// run inside a transaction obtained from [`begin`](Self::begin) and
/// become visible on [`commit`](Self::commit).
#[async_trait]
pub trait RelationalStore: Clone + Send + Sync + 'static {
    /// Open transaction handle.
    type Tx: Send;

    async fn begin(&self) -> StoreResult<Self::Tx>;

    async fn commit(&self, tx: Self::Tx) -> StoreResult<()>;

    async fn rollback(&self, tx: Self::Tx) -> StoreResult<()>;

    /// Counts the rows matching `filter`.
    async fn count(&self, filter: &Filter) -> StoreResult<i64>;

    /// Returns the rows matching `filter` as JSON objects keyed by column, ordered by id.
    async fn fetch(&self, filter: &Filter) -> StoreResult<Vec<serde_json::Value>>;

    /// Inserts a row and returns its generated id.
    async fn insert(&self, tx: &mut Self::Tx, write: &SparseWrite) -> StoreResult<EntityId>;

    /// Updates the row with `id`, returning the number of rows affected.
    async fn update(&self, tx: &mut Self::Tx, id: EntityId, write: &SparseWrite)
    -> StoreResult<u64>;
}
