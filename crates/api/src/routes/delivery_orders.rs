//! Delivery order read endpoints.

use std::sync::Arc;

use aggregator::DeliveryOrderDetail;
use axum::Json;
use axum::extract::{Path, State};
use common::EntityId;
use domain::DeliveryOrder;
use journey::JourneyEvent;
use repository::{Entity, RelationalStore};

use crate::AppState;
use crate::error::ApiError;

/// GET /delivery-orders/{id}: the order with its sales order and related records.
#[tracing::instrument(skip(state))]
pub async fn get<S: RelationalStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<DeliveryOrderDetail>, ApiError> {
    let detail = state
        .aggregator
        .delivery_order_detail(EntityId::new(id))
        .await?
        .require(DeliveryOrder::NAME, format!("id = {id}"))?;
    Ok(Json(detail))
}

/// GET /delivery-orders/{id}/journeys: status history, oldest first.
#[tracing::instrument(skip(state))]
pub async fn journeys<S: RelationalStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<JourneyEvent>>, ApiError> {
    let id = EntityId::new(id);
    let repos = state.aggregator.repositories();
    repos.delivery_orders.get_by_id(id, true).await?;
    let events = repos.journeys.list_for_entity(DeliveryOrder::NAME, id).await?;
    Ok(Json(events))
}
