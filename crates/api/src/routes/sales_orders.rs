//! Sales order read endpoints.

use std::sync::Arc;

use aggregator::SalesOrderDetail;
use axum::Json;
use axum::extract::{Path, State};
use common::EntityId;
use domain::SalesOrder;
use journey::JourneyEvent;
use repository::{Entity, RelationalStore};

use crate::AppState;
use crate::error::ApiError;

/// GET /sales-orders/{id}: the order with its related records.
#[tracing::instrument(skip(state))]
pub async fn get<S: RelationalStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<SalesOrderDetail>, ApiError> {
    let detail = state
        .aggregator
        .sales_order_detail(EntityId::new(id))
        .await?
        .require(SalesOrder::NAME, format!("id = {id}"))?;
    Ok(Json(detail))
}

/// GET /sales-orders/{id}/journeys: status history, oldest first.
#[tracing::instrument(skip(state))]
pub async fn journeys<S: RelationalStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<JourneyEvent>>, ApiError> {
    let id = EntityId::new(id);
    let repos = state.aggregator.repositories();
    repos.sales_orders.get_by_id(id, true).await?;
    let events = repos.journeys.list_for_entity(SalesOrder::NAME, id).await?;
    Ok(Json(events))
}
