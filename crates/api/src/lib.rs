//! Read-only HTTP API for the distribution backend.
//!
//! Serves composed sales and delivery order views and their journeys,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use aggregator::OrderAggregator;
use axum::Router;
use axum::routing::get;
use cache::{Cache, InMemoryCache};
use domain::{Repositories, seed_default_statuses};
use journey::{InMemoryJourneyLog, JourneyLog, PostgresJourneyLog};
use metrics_exporter_prometheus::PrometheusHandle;
use repository::{InMemoryRelationalStore, PgRelationalStore, RelationalStore};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState<S: RelationalStore> {
    pub aggregator: OrderAggregator<S>,
}

impl<S: RelationalStore> AppState<S> {
    pub fn new(repos: Repositories<S>) -> Self {
        Self {
            aggregator: OrderAggregator::new(repos),
        }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: RelationalStore>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/sales-orders/{id}", get(routes::sales_orders::get::<S>))
        .route(
            "/sales-orders/{id}/journeys",
            get(routes::sales_orders::journeys::<S>),
        )
        .route("/delivery-orders/{id}", get(routes::delivery_orders::get::<S>))
        .route(
            "/delivery-orders/{id}/journeys",
            get(routes::delivery_orders::journeys::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the snapshot cache and starts its expired-entry sweeper.
///
/// The sweeper runs on the current runtime until it shuts down.
pub fn snapshot_cache(config: &Config) -> Arc<dyn Cache> {
    let cache = InMemoryCache::new();
    cache.spawn_sweeper(config.cache_sweep);
    Arc::new(cache)
}

/// Builds in-memory repositories with the default statuses seeded.
pub async fn in_memory_state(
    config: &Config,
) -> Result<Arc<AppState<InMemoryRelationalStore>>, domain::DomainError> {
    let cache = snapshot_cache(config);
    let journeys: Arc<dyn JourneyLog> = Arc::new(InMemoryJourneyLog::new());
    let repos = Repositories::with_ttl(
        InMemoryRelationalStore::new(),
        cache,
        journeys,
        config.cache_ttl,
    );
    let seeded = seed_default_statuses(&repos.order_statuses).await?;
    tracing::info!(seeded, "in-memory stores ready");
    Ok(Arc::new(AppState::new(repos)))
}

/// Connects to PostgreSQL, applies migrations and builds the repositories.
pub async fn postgres_state(
    config: &Config,
    url: &str,
) -> Result<Arc<AppState<PgRelationalStore>>, repository::StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(url)
        .await?;
    let store = PgRelationalStore::new(pool.clone());
    store.run_migrations().await?;

    let cache = snapshot_cache(config);
    let journeys: Arc<dyn JourneyLog> = Arc::new(PostgresJourneyLog::new(pool));
    let repos = Repositories::with_ttl(store, cache, journeys, config.cache_ttl);
    tracing::info!(
        max_connections = config.database_max_connections,
        "postgres stores ready"
    );
    Ok(Arc::new(AppState::new(repos)))
}
