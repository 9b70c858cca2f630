//! PostgreSQL integration tests for the journey log.
//!
//! Run with:
//!
//! ```bash
//! cargo test -p journey --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use journey::{EntityId, JourneyEvent, JourneyLog, JourneyLogExt, JourneyQuery, PostgresJourneyLog};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!("../../../migrations/001_create_tables.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn get_test_log() -> PostgresJourneyLog {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE journeys")
        .execute(&pool)
        .await
        .unwrap();

    PostgresJourneyLog::new(pool)
}

fn event(entity_id: i64, status: &str) -> JourneyEvent {
    JourneyEvent::builder()
        .entity_type("sales_order")
        .entity_id(EntityId::new(entity_id))
        .status(status)
        .remark("created from test")
        .try_build()
        .unwrap()
}

#[tokio::test]
#[serial]
async fn append_and_list_for_entity() {
    let log = get_test_log().await;

    log.append(event(1, "open")).await.unwrap();
    log.append(event(2, "open")).await.unwrap();
    log.append(event(1, "partial")).await.unwrap();

    let history = log.list_for_entity("sales_order", EntityId::new(1)).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, "open");
    assert_eq!(history[0].remark, "created from test");
    assert_eq!(history[1].status, "partial");
}

#[tokio::test]
#[serial]
async fn history_is_ordered_by_creation_time() {
    let log = get_test_log().await;
    let now = Utc::now();

    let mut closed = event(7, "closed");
    closed.created_at = now;
    let mut open = event(7, "open");
    open.created_at = now - Duration::minutes(5);

    log.append(closed).await.unwrap();
    log.append(open).await.unwrap();

    let statuses = log.status_history("sales_order", EntityId::new(7)).await.unwrap();
    assert_eq!(statuses, vec!["open", "closed"]);
}

#[tokio::test]
#[serial]
async fn query_filters_by_status_with_paging() {
    let log = get_test_log().await;
    for id in 1..=4 {
        log.append(event(id, "open")).await.unwrap();
    }
    log.append(event(1, "cancelled")).await.unwrap();

    let open = log
        .query(JourneyQuery::new().entity_type("sales_order").status("open").limit(3))
        .await
        .unwrap();
    assert_eq!(open.len(), 3);

    let cancelled = log
        .query(JourneyQuery::new().status("cancelled"))
        .await
        .unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].entity_id, EntityId::new(1));
}
