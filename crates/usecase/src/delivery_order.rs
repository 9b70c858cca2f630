use common::EntityId;
use domain::{DeliveryOrder, OrderStatus, OrderType, Repositories, SalesOrder};
use repository::{Entity, Envelope, JourneyNote, RelationalStore, UnitOfWork};

use crate::transaction::finish;
use crate::{Result, UseCaseError};

/// Creates and advances delivery orders against their sales orders.
pub struct DeliveryOrderUseCase<S: RelationalStore> {
    repos: Repositories<S>,
}

impl<S: RelationalStore> Clone for DeliveryOrderUseCase<S> {
    fn clone(&self) -> Self {
        Self {
            repos: self.repos.clone(),
        }
    }
}

impl<S: RelationalStore> DeliveryOrderUseCase<S> {
    pub fn new(repos: Repositories<S>) -> Self {
        Self { repos }
    }

    /// Creates a delivery order in status `open` for an open or partial
    /// sales order.
    ///
    /// Agent, store and warehouse default to the sales order's. An `open`
    /// sales order moves to `partial` in the same transaction.
    #[tracing::instrument(skip(self, order), fields(sales_order_id = %order.sales_order_id))]
    pub async fn create(&self, order: DeliveryOrder) -> Result<Envelope<DeliveryOrder>> {
        let mut uow = self.repos.begin().await?;
        let outcome = self.create_in(&mut uow, order).await;
        finish(uow, outcome, "delivery_order.create").await
    }

    async fn create_in(
        &self,
        uow: &mut UnitOfWork<S>,
        mut order: DeliveryOrder,
    ) -> Result<Envelope<DeliveryOrder>> {
        let sales_order_id = order.sales_order_id;
        let sales_order = self
            .repos
            .sales_orders
            .get_by_id(sales_order_id, false)
            .await?
            .require(SalesOrder::NAME, format!("id = {sales_order_id}"))?;

        let so_status = self.repos.statuses.get(sales_order.order_status_id).await?;
        if so_status.is_terminal() || so_status.name == OrderStatus::CLOSED {
            return Err(UseCaseError::order_closed(
                SalesOrder::NAME,
                sales_order_id,
                &so_status.name,
            ));
        }

        if order.agent_id.is_zero() {
            order.agent_id = sales_order.agent_id;
        }
        if order.store_id.is_zero() {
            order.store_id = sales_order.store_id;
        }
        if order.warehouse_id.is_zero() {
            order.warehouse_id = sales_order.warehouse_id;
        }
        let open = self
            .repos
            .statuses
            .by_name(OrderType::DeliveryOrder, OrderStatus::OPEN)
            .await?;
        order.order_status_id = open.id;

        let created = self.repos.delivery_orders.insert(order, uow).await?;

        if so_status.name == OrderStatus::OPEN {
            let partial = self
                .repos
                .statuses
                .check_transition(OrderType::SalesOrder, so_status.id, self.partial_id().await?)
                .await?;
            let do_code = created
                .data
                .as_ref()
                .map(|d| d.do_code.clone())
                .unwrap_or_default();
            let patch = SalesOrder {
                order_status_id: partial.id,
                journey: JourneyNote::new(format!("delivery order {do_code} created"), ""),
                ..Default::default()
            };
            self.repos
                .sales_orders
                .update_by_id(sales_order_id, patch, uow)
                .await?;
        }

        Ok(created)
    }

    async fn partial_id(&self) -> Result<EntityId> {
        Ok(self
            .repos
            .statuses
            .by_name(OrderType::SalesOrder, OrderStatus::PARTIAL)
            .await?
            .id)
    }

    /// Moves the delivery order `id` to the status named `status`.
    #[tracing::instrument(skip(self, note), fields(id = %id))]
    pub async fn update_status(
        &self,
        id: EntityId,
        status: &str,
        note: JourneyNote,
    ) -> Result<Envelope<DeliveryOrder>> {
        let mut uow = self.repos.begin().await?;
        let outcome = self.update_status_in(&mut uow, id, status, note).await;
        finish(uow, outcome, "delivery_order.update_status").await
    }

    async fn update_status_in(
        &self,
        uow: &mut UnitOfWork<S>,
        id: EntityId,
        status: &str,
        note: JourneyNote,
    ) -> Result<Envelope<DeliveryOrder>> {
        let current = self
            .repos
            .delivery_orders
            .get_by_id(id, false)
            .await?
            .require(DeliveryOrder::NAME, format!("id = {id}"))?;
        let next = self
            .repos
            .statuses
            .by_name(OrderType::DeliveryOrder, status)
            .await?;
        self.repos
            .statuses
            .check_transition(OrderType::DeliveryOrder, current.order_status_id, next.id)
            .await?;

        let patch = DeliveryOrder {
            order_status_id: next.id,
            journey: note,
            ..Default::default()
        };
        Ok(self.repos.delivery_orders.update_by_id(id, patch, uow).await?)
    }

    /// Cancels and soft-deletes the delivery order `id`.
    #[tracing::instrument(skip(self, note), fields(id = %id))]
    pub async fn delete(&self, id: EntityId, note: JourneyNote) -> Result<Envelope<DeliveryOrder>> {
        let mut uow = self.repos.begin().await?;
        let outcome = self.delete_in(&mut uow, id, note).await;
        finish(uow, outcome, "delivery_order.delete").await
    }

    async fn delete_in(
        &self,
        uow: &mut UnitOfWork<S>,
        id: EntityId,
        note: JourneyNote,
    ) -> Result<Envelope<DeliveryOrder>> {
        let mut current = self
            .repos
            .delivery_orders
            .get_by_id(id, false)
            .await?
            .require(DeliveryOrder::NAME, format!("id = {id}"))?;

        let cancelled = self
            .repos
            .statuses
            .by_name(OrderType::DeliveryOrder, OrderStatus::CANCELLED)
            .await?;
        self.repos
            .statuses
            .check_transition(OrderType::DeliveryOrder, current.order_status_id, cancelled.id)
            .await?;

        current.journey = note;
        Ok(self.repos.delivery_orders.delete_by_id(current, uow).await?)
    }
}
