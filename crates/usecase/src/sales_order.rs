use common::EntityId;
use domain::{OrderStatus, OrderType, Repositories, SalesOrder};
use repository::{Entity, Envelope, JourneyNote, RelationalStore, UnitOfWork};

use crate::Result;
use crate::transaction::finish;

/// Creates, updates and cancels sales orders, one transaction per call.
pub struct SalesOrderUseCase<S: RelationalStore> {
    repos: Repositories<S>,
}

impl<S: RelationalStore> Clone for SalesOrderUseCase<S> {
    fn clone(&self) -> Self {
        Self {
            repos: self.repos.clone(),
        }
    }
}

impl<S: RelationalStore> SalesOrderUseCase<S> {
    pub fn new(repos: Repositories<S>) -> Self {
        Self { repos }
    }

    /// Creates a sales order in status `open`.
    ///
    /// The agent and store must exist. `order.journey` supplies the remark
    /// recorded with the opening journey event.
    #[tracing::instrument(skip(self, order), fields(so_code = %order.so_code))]
    pub async fn create(&self, order: SalesOrder) -> Result<Envelope<SalesOrder>> {
        let mut uow = self.repos.begin().await?;
        let outcome = self.create_in(&mut uow, order).await;
        finish(uow, outcome, "sales_order.create").await
    }

    async fn create_in(
        &self,
        uow: &mut UnitOfWork<S>,
        mut order: SalesOrder,
    ) -> Result<Envelope<SalesOrder>> {
        self.repos.agents.get_by_id(order.agent_id, true).await?;
        self.repos.stores.get_by_id(order.store_id, true).await?;

        let open = self
            .repos
            .statuses
            .by_name(OrderType::SalesOrder, OrderStatus::OPEN)
            .await?;
        order.order_status_id = open.id;

        Ok(self.repos.sales_orders.insert(order, uow).await?)
    }

    /// Applies the non-blank fields of `patch` to the sales order `id`.
    ///
    /// A patch carrying a status must respect the transition rules.
    #[tracing::instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: EntityId, patch: SalesOrder) -> Result<Envelope<SalesOrder>> {
        let mut uow = self.repos.begin().await?;
        let outcome = self.update_in(&mut uow, id, patch).await;
        finish(uow, outcome, "sales_order.update").await
    }

    async fn update_in(
        &self,
        uow: &mut UnitOfWork<S>,
        id: EntityId,
        patch: SalesOrder,
    ) -> Result<Envelope<SalesOrder>> {
        if let Some(next) = patch.status_id() {
            let current = self
                .repos
                .sales_orders
                .get_by_id(id, false)
                .await?
                .require(SalesOrder::NAME, format!("id = {id}"))?;
            self.repos
                .statuses
                .check_transition(OrderType::SalesOrder, current.order_status_id, next)
                .await?;
        }

        Ok(self.repos.sales_orders.update_by_id(id, patch, uow).await?)
    }

    /// Cancels and soft-deletes the sales order `id`.
    #[tracing::instrument(skip(self, note), fields(id = %id))]
    pub async fn delete(&self, id: EntityId, note: JourneyNote) -> Result<Envelope<SalesOrder>> {
        let mut uow = self.repos.begin().await?;
        let outcome = self.delete_in(&mut uow, id, note).await;
        finish(uow, outcome, "sales_order.delete").await
    }

    async fn delete_in(
        &self,
        uow: &mut UnitOfWork<S>,
        id: EntityId,
        note: JourneyNote,
    ) -> Result<Envelope<SalesOrder>> {
        let mut current = self
            .repos
            .sales_orders
            .get_by_id(id, false)
            .await?
            .require(SalesOrder::NAME, format!("id = {id}"))?;

        let cancelled = self
            .repos
            .statuses
            .by_name(OrderType::SalesOrder, OrderStatus::CANCELLED)
            .await?;
        self.repos
            .statuses
            .check_transition(OrderType::SalesOrder, current.order_status_id, cancelled.id)
            .await?;

        current.journey = note;
        Ok(self.repos.sales_orders.delete_by_id(current, uow).await?)
    }
}
