use async_trait::async_trait;
use common::EntityId;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::{ColumnValue, Filter, RelationalStore, SparseWrite, StoreResult};

/// PostgreSQL-backed relational store.
#[derive(Clone)]
pub struct PgRelationalStore {
    pool: PgPool,
}

impl PgRelationalStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn push_value(builder: &mut QueryBuilder<'static, Postgres>, value: &ColumnValue) {
    match value.clone() {
        ColumnValue::Int(v) => builder.push_bind(v),
        ColumnValue::Float(v) => builder.push_bind(v),
        ColumnValue::Text(v) => builder.push_bind(v),
        ColumnValue::Bool(v) => builder.push_bind(v),
        ColumnValue::Timestamp(v) => builder.push_bind(v),
        ColumnValue::Null => builder.push("NULL"),
    };
}

fn push_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &Filter) {
    builder.push(" WHERE 1 = 1");
    if !filter.include_deleted {
        builder.push(" AND deleted_at IS NULL");
    }
    for (column, value) in &filter.conditions {
        builder.push(" AND ");
        builder.push(*column);
        builder.push(" = ");
        push_value(builder, value);
    }
}

#[async_trait]
impl RelationalStore for PgRelationalStore {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> StoreResult<Self::Tx> {
        Ok(self.pool.begin().await?)
    }

    async fn commit(&self, tx: Self::Tx) -> StoreResult<()> {
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(&self, tx: Self::Tx) -> StoreResult<()> {
        tx.rollback().await?;
        Ok(())
    }

    async fn count(&self, filter: &Filter) -> StoreResult<i64> {
        let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", filter.table));
        push_filter(&mut builder, filter);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn fetch(&self, filter: &Filter) -> StoreResult<Vec<serde_json::Value>> {
        let mut builder =
            QueryBuilder::new(format!("SELECT to_jsonb(t) FROM {} t", filter.table));
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY id ASC");

        let rows = builder
            .build_query_scalar::<serde_json::Value>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self, tx, write), fields(table = write.table()))]
    async fn insert(&self, tx: &mut Self::Tx, write: &SparseWrite) -> StoreResult<EntityId> {
        let mut builder = QueryBuilder::new(format!("INSERT INTO {} (", write.table()));
        builder.push(write.columns().join(", "));
        builder.push(") VALUES (");
        for (i, (_, value)) in write.assignments().iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            push_value(&mut builder, value);
        }
        builder.push(") RETURNING id");

        let id = builder
            .build_query_scalar::<i64>()
            .fetch_one(&mut **tx)
            .await?;

        tracing::debug!(id, "row inserted");
        Ok(EntityId::new(id))
    }

    #[tracing::instrument(skip(self, tx, write), fields(table = write.table(), id = %id))]
    async fn update(
        &self,
        tx: &mut Self::Tx,
        id: EntityId,
        write: &SparseWrite,
    ) -> StoreResult<u64> {
        let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", write.table()));
        for (i, (column, value)) in write.assignments().iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(*column);
            builder.push(" = ");
            push_value(&mut builder, value);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id.get());
        builder.push(" AND deleted_at IS NULL");

        let affected = builder.build().execute(&mut **tx).await?.rows_affected();

        tracing::debug!(affected, "row updated");
        Ok(affected)
    }
}
