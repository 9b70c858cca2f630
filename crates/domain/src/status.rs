//! Status catalog backed by the cached `order_statuses` table.

use async_trait::async_trait;
use common::EntityId;
use journey::{JourneyError, ResolvedStatus, StatusResolver};
use repository::{Entity, EntityRepository, RelationalStore};

use crate::{DomainError, OrderStatus, OrderStatusLookups, OrderType};

/// Resolves and validates order statuses.
///
/// Lookups go through the status repository, so each status is read from
/// the database at most once per cache lifetime.
pub struct OrderStatusCatalog<S: RelationalStore> {
    statuses: EntityRepository<S, OrderStatus>,
}

impl<S: RelationalStore> Clone for OrderStatusCatalog<S> {
    fn clone(&self) -> Self {
        Self {
            statuses: self.statuses.clone(),
        }
    }
}

impl<S: RelationalStore> OrderStatusCatalog<S> {
    pub fn new(statuses: EntityRepository<S, OrderStatus>) -> Self {
        Self { statuses }
    }

    pub async fn get(&self, id: EntityId) -> Result<OrderStatus, DomainError> {
        let status = self
            .statuses
            .get_by_id(id, false)
            .await?
            .require(OrderStatus::NAME, format!("id = {id}"))?;
        Ok(status)
    }

    pub async fn by_name(&self, order_type: OrderType, name: &str) -> Result<OrderStatus, DomainError> {
        let status = self
            .statuses
            .get_by_type_and_name(order_type, name, false)
            .await?
            .require(OrderStatus::NAME, format!("{order_type} {name}"))?;
        Ok(status)
    }

    /// Loads `next` and checks that an order of `order_type` in `current` may move to it.
    ///
    /// A zero `current` means the order has no status yet; any status of the
    /// workflow is then acceptable.
    pub async fn check_transition(
        &self,
        order_type: OrderType,
        current: EntityId,
        next: EntityId,
    ) -> Result<OrderStatus, DomainError> {
        let next = self.get(next).await?;
        if next.order_type != order_type.as_str() {
            return Err(DomainError::foreign_status(order_type.as_str(), &next.name));
        }
        if current.is_zero() {
            return Ok(next);
        }

        let current = self.get(current).await?;
        if !current.permits(&next) {
            return Err(DomainError::invalid_transition(
                order_type.as_str(),
                &current.name,
                &next.name,
            ));
        }
        Ok(next)
    }
}

#[async_trait]
impl<S: RelationalStore> StatusResolver for OrderStatusCatalog<S> {
    async fn resolve(&self, status_id: EntityId) -> journey::Result<ResolvedStatus> {
        match self.statuses.get_by_id(status_id, false).await {
            Ok(envelope) => envelope
                .data
                .map(|s| ResolvedStatus {
                    id: s.id,
                    name: s.name,
                })
                .ok_or(JourneyError::UnknownStatus(status_id)),
            Err(e) if e.is_not_found() => Err(JourneyError::UnknownStatus(status_id)),
            Err(e) => Err(JourneyError::StatusLookup(e.to_string())),
        }
    }

    async fn resolve_name(&self, order_type: &str, name: &str) -> journey::Result<ResolvedStatus> {
        let order_type = match order_type {
            "sales_order" => OrderType::SalesOrder,
            "delivery_order" => OrderType::DeliveryOrder,
            other => {
                return Err(JourneyError::StatusLookup(format!(
                    "unknown order type {other}"
                )));
            }
        };
        let status = self
            .by_name(order_type, name)
            .await
            .map_err(|e| JourneyError::StatusLookup(e.to_string()))?;
        Ok(ResolvedStatus {
            id: status.id,
            name: status.name,
        })
    }
}

/// Inserts any of [`OrderStatus::DEFAULTS`] missing from the store.
///
/// PostgreSQL deployments get the defaults from the migration; this seeds
/// in-memory stores. Returns the number of statuses inserted.
pub async fn seed_default_statuses<S: RelationalStore>(
    statuses: &EntityRepository<S, OrderStatus>,
) -> Result<usize, DomainError> {
    let mut uow = statuses.begin().await?;
    let mut inserted = 0;

    for (order_type, name, sequence, terminal) in OrderStatus::DEFAULTS {
        match statuses.get_by_type_and_name(*order_type, name, true).await {
            Ok(_) => continue,
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                uow.rollback().await?;
                return Err(e.into());
            }
        }

        let status = OrderStatus::new(*order_type, name, *sequence, *terminal);
        if let Err(e) = statuses.insert(status, &mut uow).await {
            uow.rollback().await?;
            return Err(e.into());
        }
        inserted += 1;
    }

    uow.commit().await?;
    tracing::info!(inserted, "default order statuses seeded");
    Ok(inserted)
}
