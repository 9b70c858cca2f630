use std::time::Instant;

use cache::CacheKey;
use common::EntityId;
use domain::Repositories;
use repository::{Entity, EntityRepository, Envelope, RelationalStore};
use serde::{Serialize, de::DeserializeOwned};

use crate::{AggregateError, DeliveryOrderDetail, Pending, Result, SalesOrderDetail};

type Lookup<E> = Option<Pending<repository::Result<E>>>;

/// Spawns a lookup of the `E` with `id`, or nothing for a zero id.
fn spawn_lookup<S: RelationalStore, E: Entity>(
    repo: &EntityRepository<S, E>,
    id: EntityId,
) -> Lookup<E> {
    if id.is_zero() {
        return None;
    }
    let repo = repo.clone();
    Some(Pending::spawn(async move {
        repo.get_by_id(id, false)
            .await?
            .require(E::NAME, format!("id = {id}"))
    }))
}

/// Waits for a lookup spawned by [`spawn_lookup`].
async fn join_lookup<E: Send + 'static>(lookup: Lookup<E>) -> Result<Option<E>> {
    match lookup {
        Some(pending) => Ok(Some(pending.join().await??)),
        None => Ok(None),
    }
}

/// Assembles composite order views.
///
/// The root order is read first; every record it references is then
/// looked up in its own task. Results are joined in a fixed order and the
/// first failure is returned, aborting the lookups still running. A view
/// is only cached when every lookup succeeded.
pub struct OrderAggregator<S: RelationalStore> {
    repos: Repositories<S>,
}

impl<S: RelationalStore> Clone for OrderAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            repos: self.repos.clone(),
        }
    }
}

impl<S: RelationalStore> OrderAggregator<S> {
    pub fn new(repos: Repositories<S>) -> Self {
        Self { repos }
    }

    pub fn repositories(&self) -> &Repositories<S> {
        &self.repos
    }

    /// Returns a sales order with its agent, store, brand, user, salesman,
    /// warehouse and status.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub async fn sales_order_detail(&self, id: EntityId) -> Result<Envelope<SalesOrderDetail>> {
        let started = Instant::now();
        let key = CacheKey::by_id(SalesOrderDetail::NAMESPACE, id);
        if let Some(detail) = self.cached(&key).await? {
            return Ok(Envelope::found(detail, 1));
        }

        let order = self
            .repos
            .sales_orders
            .get_by_id(id, false)
            .await?
            .require(domain::SalesOrder::NAME, format!("id = {id}"))?;

        let agent = spawn_lookup(&self.repos.agents, order.agent_id);
        let store = spawn_lookup(&self.repos.stores, order.store_id);
        let brand = spawn_lookup(&self.repos.brands, order.brand_id);
        let user = spawn_lookup(&self.repos.users, order.user_id);
        let salesman = spawn_lookup(&self.repos.salesmen, order.salesman_id);
        let warehouse = spawn_lookup(&self.repos.warehouses, order.warehouse_id);
        let status = spawn_lookup(&self.repos.order_statuses, order.order_status_id);

        let detail = SalesOrderDetail {
            agent: join_lookup(agent).await?,
            store: join_lookup(store).await?,
            brand: join_lookup(brand).await?,
            user: join_lookup(user).await?,
            salesman: join_lookup(salesman).await?,
            warehouse: join_lookup(warehouse).await?,
            status: join_lookup(status).await?,
            sales_order: order,
        };

        self.populate(&key, &detail).await?;
        record(SalesOrderDetail::NAMESPACE, started);
        Ok(Envelope::found(detail, 1))
    }

    /// Returns a delivery order with its sales order, agent, store,
    /// warehouse and status.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub async fn delivery_order_detail(
        &self,
        id: EntityId,
    ) -> Result<Envelope<DeliveryOrderDetail>> {
        let started = Instant::now();
        let key = CacheKey::by_id(DeliveryOrderDetail::NAMESPACE, id);
        if let Some(detail) = self.cached(&key).await? {
            return Ok(Envelope::found(detail, 1));
        }

        let order = self
            .repos
            .delivery_orders
            .get_by_id(id, false)
            .await?
            .require(domain::DeliveryOrder::NAME, format!("id = {id}"))?;

        let sales_order = spawn_lookup(&self.repos.sales_orders, order.sales_order_id);
        let agent = spawn_lookup(&self.repos.agents, order.agent_id);
        let store = spawn_lookup(&self.repos.stores, order.store_id);
        let warehouse = spawn_lookup(&self.repos.warehouses, order.warehouse_id);
        let status = spawn_lookup(&self.repos.order_statuses, order.order_status_id);

        let detail = DeliveryOrderDetail {
            sales_order: join_lookup(sales_order).await?,
            agent: join_lookup(agent).await?,
            store: join_lookup(store).await?,
            warehouse: join_lookup(warehouse).await?,
            status: join_lookup(status).await?,
            delivery_order: order,
        };

        self.populate(&key, &detail).await?;
        record(DeliveryOrderDetail::NAMESPACE, started);
        Ok(Envelope::found(detail, 1))
    }

    async fn cached<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>> {
        let raw = self
            .repos
            .cache()
            .get(key)
            .await
            .map_err(AggregateError::cache)?;
        match raw {
            Some(raw) => {
                metrics::counter!("cache_hits_total", "entity" => key.namespace().to_string())
                    .increment(1);
                serde_json::from_str(&raw)
                    .map(Some)
                    .map_err(AggregateError::serialization)
            }
            None => {
                metrics::counter!("cache_misses_total", "entity" => key.namespace().to_string())
                    .increment(1);
                Ok(None)
            }
        }
    }

    async fn populate<T: Serialize>(&self, key: &CacheKey, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(AggregateError::serialization)?;
        self.repos
            .cache()
            .set(key, raw, self.repos.ttl())
            .await
            .map_err(AggregateError::cache)
    }
}

fn record(view: &'static str, started: Instant) {
    metrics::counter!("aggregator_lookups_total", "view" => view).increment(1);
    metrics::histogram!("aggregator_duration_seconds", "view" => view)
        .record(started.elapsed().as_secs_f64());
}
