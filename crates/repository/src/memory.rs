use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use common::EntityId;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::{ColumnValue, Filter, RelationalStore, SparseWrite, StoreError, StoreResult};

type Row = Map<String, Value>;

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Row>,
}

#[derive(Debug)]
enum Staged {
    Insert { table: &'static str, id: i64, row: Row },
    Update { table: &'static str, id: i64, row: Row },
}

/// Open transaction against an [`InMemoryRelationalStore`].
///
/// Writes are staged and applied atomically on commit; dropping or rolling
/// back discards them. Ids are allocated eagerly, so a rolled-back insert
/// leaves a gap, as a database sequence would.
#[derive(Debug, Default)]
pub struct InMemoryTx {
    staged: Vec<Staged>,
}

impl InMemoryTx {
    /// Replays this transaction's writes for one row over its committed state.
    fn overlay(&self, table: &str, id: i64, committed: Option<Row>) -> Option<Row> {
        self.staged.iter().fold(committed, |row, staged| match staged {
            Staged::Insert { table: t, id: i, row: new } if *t == table && *i == id => {
                Some(new.clone())
            }
            Staged::Update { table: t, id: i, row: changes } if *t == table && *i == id => {
                row.map(|mut row| {
                    row.extend(changes.clone());
                    row
                })
            }
            _ => row,
        })
    }
}

#[derive(Debug, Default)]
struct Inner {
    tables: RwLock<HashMap<&'static str, Table>>,
    statements: RwLock<Vec<String>>,
    queries: AtomicU64,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// In-memory relational store for testing.
///
/// Rows are JSON objects keyed by column name. Columns never written are
/// absent and read back as the type's zero value, matching the schema
/// defaults of the PostgreSQL tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRelationalStore {
    inner: Arc<Inner>,
}

impl InMemoryRelationalStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent reads fail as if the database were unreachable.
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent writes fail as if the database were unreachable.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of COUNT and SELECT queries served.
    pub fn query_count(&self) -> u64 {
        self.inner.queries.load(Ordering::SeqCst)
    }

    /// Returns every insert and update statement issued, in order.
    pub async fn statements(&self) -> Vec<String> {
        self.inner.statements.read().await.clone()
    }

    /// Returns the committed rows of `table`, soft-deleted ones included.
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.inner
            .tables
            .read()
            .await
            .get(table)
            .map(|t| t.rows.values().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    fn check_reads(&self) -> StoreResult<()> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        self.inner.queries.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn check_writes(&self) -> StoreResult<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    async fn matching(&self, filter: &Filter) -> Vec<Row> {
        let tables = self.inner.tables.read().await;
        let Some(table) = tables.get(filter.table) else {
            return Vec::new();
        };
        table
            .rows
            .values()
            .filter(|row| filter.include_deleted || !is_deleted(row))
            .filter(|row| {
                filter
                    .conditions
                    .iter()
                    .all(|(column, value)| cell_matches(row, column, value))
            })
            .cloned()
            .collect()
    }
}

fn is_deleted(row: &Row) -> bool {
    row.get("deleted_at").is_some_and(|v| !v.is_null())
}

fn cell_matches(row: &Row, column: &str, value: &ColumnValue) -> bool {
    match row.get(column) {
        Some(cell) => *cell == value.to_json(),
        None => value.is_blank(),
    }
}

fn to_row(write: &SparseWrite) -> Row {
    write
        .assignments()
        .iter()
        .map(|(column, value)| (column.to_string(), value.to_json()))
        .collect()
}

#[async_trait]
impl RelationalStore for InMemoryRelationalStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> StoreResult<Self::Tx> {
        self.check_writes()?;
        Ok(InMemoryTx::default())
    }

    async fn commit(&self, tx: Self::Tx) -> StoreResult<()> {
        self.check_writes()?;
        let mut tables = self.inner.tables.write().await;
        for staged in tx.staged {
            match staged {
                Staged::Insert { table, id, row } => {
                    tables.entry(table).or_default().rows.insert(id, row);
                }
                Staged::Update { table, id, row } => {
                    if let Some(existing) = tables
                        .get_mut(table)
                        .and_then(|t| t.rows.get_mut(&id))
                    {
                        existing.extend(row);
                    }
                }
            }
        }
        Ok(())
    }

    async fn rollback(&self, _tx: Self::Tx) -> StoreResult<()> {
        Ok(())
    }

    async fn count(&self, filter: &Filter) -> StoreResult<i64> {
        self.check_reads()?;
        Ok(self.matching(filter).await.len() as i64)
    }

    async fn fetch(&self, filter: &Filter) -> StoreResult<Vec<Value>> {
        self.check_reads()?;
        Ok(self
            .matching(filter)
            .await
            .into_iter()
            .map(Value::Object)
            .collect())
    }

    async fn insert(&self, tx: &mut Self::Tx, write: &SparseWrite) -> StoreResult<EntityId> {
        self.check_writes()?;
        let id = {
            let mut tables = self.inner.tables.write().await;
            let table = tables.entry(write.table()).or_default();
            table.next_id += 1;
            table.next_id
        };

        let mut row = to_row(write);
        row.insert("id".to_string(), Value::from(id));
        tx.staged.push(Staged::Insert {
            table: write.table(),
            id,
            row,
        });
        self.inner.statements.write().await.push(write.insert_sql());
        Ok(EntityId::new(id))
    }

    async fn update(
        &self,
        tx: &mut Self::Tx,
        id: EntityId,
        write: &SparseWrite,
    ) -> StoreResult<u64> {
        self.check_writes()?;
        self.inner.statements.write().await.push(write.update_sql());

        let committed = self
            .inner
            .tables
            .read()
            .await
            .get(write.table())
            .and_then(|t| t.rows.get(&id.get()).cloned());
        let live = tx
            .overlay(write.table(), id.get(), committed)
            .is_some_and(|row| !is_deleted(&row));
        if !live {
            return Ok(0);
        }

        tx.staged.push(Staged::Update {
            table: write.table(),
            id: id.get(),
            row: to_row(write),
        });
        Ok(1)
    }
}
