use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::log::validate_for_append;
use crate::{EntityId, JourneyEvent, JourneyEventId, JourneyLog, JourneyQuery, Result};

/// PostgreSQL-backed journey log.
///
/// Rows live in the `journeys` table; `seq` breaks ties between events
/// recorded in the same instant.
#[derive(Clone)]
pub struct PostgresJourneyLog {
    pool: PgPool,
}

impl PostgresJourneyLog {
    /// Creates a new PostgreSQL journey log.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_event(row: PgRow) -> Result<JourneyEvent> {
        Ok(JourneyEvent {
            id: JourneyEventId::from_uuid(row.try_get::<Uuid, _>("id")?),
            entity_type: row.try_get("entity_type")?,
            entity_id: EntityId::new(row.try_get("entity_id")?),
            status: row.try_get("status")?,
            remark: row.try_get("remark")?,
            reason: row.try_get("reason")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl JourneyLog for PostgresJourneyLog {
    #[tracing::instrument(skip(self, event), fields(entity_type = %event.entity_type, entity_id = %event.entity_id))]
    async fn append(&self, event: JourneyEvent) -> Result<JourneyEvent> {
        validate_for_append(&event)?;

        sqlx::query(
            r#"
            INSERT INTO journeys (id, entity_type, entity_id, status, remark, reason, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(&event.entity_type)
        .bind(event.entity_id.get())
        .bind(&event.status)
        .bind(&event.remark)
        .bind(&event.reason)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;

        Ok(event)
    }

    async fn list_for_entity(
        &self,
        entity_type: &str,
        entity_id: EntityId,
    ) -> Result<Vec<JourneyEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, entity_type, entity_id, status, remark, reason, created_at
            FROM journeys
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(entity_type)
        .bind(entity_id.get())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn query(&self, query: JourneyQuery) -> Result<Vec<JourneyEvent>> {
        let mut sql = String::from(
            "SELECT id, entity_type, entity_id, status, remark, reason, created_at FROM journeys WHERE 1=1",
        );
        let mut param_count = 0;

        // Build dynamic query
        if query.entity_type.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND entity_type = ${param_count}"));
        }
        if query.entity_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND entity_id = ${param_count}"));
        }
        if query.statuses.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ANY(${param_count})"));
        }
        if query.from_timestamp.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at >= ${param_count}"));
        }
        if query.to_timestamp.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND created_at <= ${param_count}"));
        }

        sql.push_str(" ORDER BY created_at ASC, seq ASC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(entity_type) = query.entity_type {
            sqlx_query = sqlx_query.bind(entity_type);
        }
        if let Some(id) = query.entity_id {
            sqlx_query = sqlx_query.bind(id.get());
        }
        if let Some(statuses) = query.statuses {
            sqlx_query = sqlx_query.bind(statuses);
        }
        if let Some(from_ts) = query.from_timestamp {
            sqlx_query = sqlx_query.bind(from_ts);
        }
        if let Some(to_ts) = query.to_timestamp {
            sqlx_query = sqlx_query.bind(to_ts);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_event).collect()
    }
}
