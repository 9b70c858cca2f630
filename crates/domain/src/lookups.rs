//! Entity-specific lookups layered on the generic repository.

use async_trait::async_trait;
use common::EntityId;
use repository::{ColumnValue, EntityRepository, Envelope, Lookup, RelationalStore, Result};

use crate::{DeliveryOrder, OrderStatus, OrderType, SalesOrder, Salesman, Store, Warehouse};

#[async_trait]
pub trait StoreLookups {
    /// Store by its business code, cached under `store:store_code:<code>`.
    async fn get_by_store_code(&self, store_code: &str, count_only: bool)
    -> Result<Envelope<Store>>;
}

#[async_trait]
impl<S: RelationalStore> StoreLookups for EntityRepository<S, Store> {
    async fn get_by_store_code(
        &self,
        store_code: &str,
        count_only: bool,
    ) -> Result<Envelope<Store>> {
        self.get_one_by(Lookup::by_field::<Store>("store_code", store_code), count_only)
            .await
    }
}

#[async_trait]
pub trait SalesmanLookups {
    /// All salesmen of an agent.
    async fn get_by_agent_id(
        &self,
        agent_id: EntityId,
        count_only: bool,
    ) -> Result<Envelope<Vec<Salesman>>>;
}

#[async_trait]
impl<S: RelationalStore> SalesmanLookups for EntityRepository<S, Salesman> {
    async fn get_by_agent_id(
        &self,
        agent_id: EntityId,
        count_only: bool,
    ) -> Result<Envelope<Vec<Salesman>>> {
        self.get_many_by(Lookup::by_field::<Salesman>("agent_id", agent_id), count_only)
            .await
    }
}

#[async_trait]
pub trait WarehouseLookups {
    /// All warehouses of an agent.
    async fn get_by_agent_id(
        &self,
        agent_id: EntityId,
        count_only: bool,
    ) -> Result<Envelope<Vec<Warehouse>>>;
}

#[async_trait]
impl<S: RelationalStore> WarehouseLookups for EntityRepository<S, Warehouse> {
    async fn get_by_agent_id(
        &self,
        agent_id: EntityId,
        count_only: bool,
    ) -> Result<Envelope<Vec<Warehouse>>> {
        self.get_many_by(Lookup::by_field::<Warehouse>("agent_id", agent_id), count_only)
            .await
    }
}

#[async_trait]
pub trait OrderStatusLookups {
    /// Status by workflow and name, cached under `order_status:<type>:<name>`.
    async fn get_by_type_and_name(
        &self,
        order_type: OrderType,
        name: &str,
        count_only: bool,
    ) -> Result<Envelope<OrderStatus>>;
}

#[async_trait]
impl<S: RelationalStore> OrderStatusLookups for EntityRepository<S, OrderStatus> {
    async fn get_by_type_and_name(
        &self,
        order_type: OrderType,
        name: &str,
        count_only: bool,
    ) -> Result<Envelope<OrderStatus>> {
        let lookup = Lookup::by_pair::<OrderStatus>(
            ("order_type", ColumnValue::from(order_type.as_str())),
            ("name", ColumnValue::from(name)),
        );
        self.get_one_by(lookup, count_only).await
    }
}

#[async_trait]
pub trait SalesOrderLookups {
    async fn get_by_so_code(&self, so_code: &str, count_only: bool)
    -> Result<Envelope<SalesOrder>>;

    /// All sales orders of an agent.
    async fn get_by_agent_id(
        &self,
        agent_id: EntityId,
        count_only: bool,
    ) -> Result<Envelope<Vec<SalesOrder>>>;
}

#[async_trait]
impl<S: RelationalStore> SalesOrderLookups for EntityRepository<S, SalesOrder> {
    async fn get_by_so_code(
        &self,
        so_code: &str,
        count_only: bool,
    ) -> Result<Envelope<SalesOrder>> {
        self.get_one_by(Lookup::by_field::<SalesOrder>("so_code", so_code), count_only)
            .await
    }

    async fn get_by_agent_id(
        &self,
        agent_id: EntityId,
        count_only: bool,
    ) -> Result<Envelope<Vec<SalesOrder>>> {
        self.get_many_by(Lookup::by_field::<SalesOrder>("agent_id", agent_id), count_only)
            .await
    }
}

#[async_trait]
pub trait DeliveryOrderLookups {
    async fn get_by_do_code(
        &self,
        do_code: &str,
        count_only: bool,
    ) -> Result<Envelope<DeliveryOrder>>;

    /// All delivery orders fulfilling a sales order.
    async fn get_by_sales_order_id(
        &self,
        sales_order_id: EntityId,
        count_only: bool,
    ) -> Result<Envelope<Vec<DeliveryOrder>>>;
}

#[async_trait]
impl<S: RelationalStore> DeliveryOrderLookups for EntityRepository<S, DeliveryOrder> {
    async fn get_by_do_code(
        &self,
        do_code: &str,
        count_only: bool,
    ) -> Result<Envelope<DeliveryOrder>> {
        self.get_one_by(Lookup::by_field::<DeliveryOrder>("do_code", do_code), count_only)
            .await
    }

    async fn get_by_sales_order_id(
        &self,
        sales_order_id: EntityId,
        count_only: bool,
    ) -> Result<Envelope<Vec<DeliveryOrder>>> {
        let lookup = Lookup::by_field::<DeliveryOrder>("sales_order_id", sales_order_id);
        self.get_many_by(lookup, count_only).await
    }
}
