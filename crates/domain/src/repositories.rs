use std::sync::Arc;
use std::time::Duration;

use cache::{Cache, SNAPSHOT_TTL};
use journey::JourneyLog;
use repository::{Entity, EntityRepository, Journal, RelationalStore, Result, UnitOfWork};

use crate::{
    Agent, Brand, DeliveryOrder, OrderStatus, OrderStatusCatalog, SalesOrder, Salesman, Store,
    User, Warehouse,
};

pub type AgentRepository<S> = EntityRepository<S, Agent>;
pub type StoreRepository<S> = EntityRepository<S, Store>;
pub type BrandRepository<S> = EntityRepository<S, Brand>;
pub type UserRepository<S> = EntityRepository<S, User>;
pub type SalesmanRepository<S> = EntityRepository<S, Salesman>;
pub type WarehouseRepository<S> = EntityRepository<S, Warehouse>;
pub type OrderStatusRepository<S> = EntityRepository<S, OrderStatus>;
pub type SalesOrderRepository<S> = EntityRepository<S, SalesOrder>;
pub type DeliveryOrderRepository<S> = EntityRepository<S, DeliveryOrder>;

fn plain<S: RelationalStore, E: Entity>(
    store: &S,
    cache: &Arc<dyn Cache>,
    ttl: Duration,
) -> EntityRepository<S, E> {
    EntityRepository::new(store.clone(), cache.clone()).with_ttl(ttl)
}

/// Every entity repository over one store, cache and journey log.
///
/// Order repositories journal their status changes through the status
/// catalog; the rest write without a journal.
pub struct Repositories<S: RelationalStore> {
    pub agents: AgentRepository<S>,
    pub stores: StoreRepository<S>,
    pub brands: BrandRepository<S>,
    pub users: UserRepository<S>,
    pub salesmen: SalesmanRepository<S>,
    pub warehouses: WarehouseRepository<S>,
    pub order_statuses: OrderStatusRepository<S>,
    pub sales_orders: SalesOrderRepository<S>,
    pub delivery_orders: DeliveryOrderRepository<S>,
    pub statuses: OrderStatusCatalog<S>,
    pub journeys: Arc<dyn JourneyLog>,
    store: S,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl<S: RelationalStore> Clone for Repositories<S> {
    fn clone(&self) -> Self {
        Self {
            agents: self.agents.clone(),
            stores: self.stores.clone(),
            brands: self.brands.clone(),
            users: self.users.clone(),
            salesmen: self.salesmen.clone(),
            warehouses: self.warehouses.clone(),
            order_statuses: self.order_statuses.clone(),
            sales_orders: self.sales_orders.clone(),
            delivery_orders: self.delivery_orders.clone(),
            statuses: self.statuses.clone(),
            journeys: self.journeys.clone(),
            store: self.store.clone(),
            cache: self.cache.clone(),
            ttl: self.ttl,
        }
    }
}

impl<S: RelationalStore> Repositories<S> {
    /// Builds the repositories with the default snapshot TTL.
    pub fn new(store: S, cache: Arc<dyn Cache>, journeys: Arc<dyn JourneyLog>) -> Self {
        Self::with_ttl(store, cache, journeys, SNAPSHOT_TTL)
    }

    pub fn with_ttl(
        store: S,
        cache: Arc<dyn Cache>,
        journeys: Arc<dyn JourneyLog>,
        ttl: Duration,
    ) -> Self {
        let order_statuses: OrderStatusRepository<S> = plain(&store, &cache, ttl);
        let statuses = OrderStatusCatalog::new(order_statuses.clone());
        let journal = Journal {
            log: journeys.clone(),
            statuses: Arc::new(statuses.clone()),
        };

        Self {
            agents: plain(&store, &cache, ttl),
            stores: plain(&store, &cache, ttl),
            brands: plain(&store, &cache, ttl),
            users: plain(&store, &cache, ttl),
            salesmen: plain(&store, &cache, ttl),
            warehouses: plain(&store, &cache, ttl),
            order_statuses,
            sales_orders: plain(&store, &cache, ttl).with_journal(journal.clone()),
            delivery_orders: plain(&store, &cache, ttl).with_journal(journal),
            statuses,
            journeys,
            store,
            cache,
            ttl,
        }
    }

    /// Opens a unit of work spanning writes to any of the repositories.
    pub async fn begin(&self) -> Result<UnitOfWork<S>> {
        UnitOfWork::begin(&self.store, self.cache.clone()).await
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    /// Lifetime of cached snapshots, shared by composite views.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
