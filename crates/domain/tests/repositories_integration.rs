//! Domain repositories over the in-memory store, cache and journey log.

use std::sync::Arc;

use cache::{Cache, CacheKey, InMemoryCache, SNAPSHOT_TTL};
use common::{EntityId, ErrorKind};
use domain::{
    Agent, DeliveryOrderLookups, DomainError, OrderStatus, OrderStatusLookups, OrderType,
    Repositories, SalesOrder, SalesOrderLookups, Salesman, SalesmanLookups, Store, StoreLookups,
    Warehouse, WarehouseLookups, seed_default_statuses,
};
use journey::{InMemoryJourneyLog, JourneyLogExt, StatusResolver};
use repository::{InMemoryRelationalStore, JourneyNote};

struct Fixture {
    repos: Repositories<InMemoryRelationalStore>,
    cache: InMemoryCache,
    log: InMemoryJourneyLog,
}

async fn fixture() -> Fixture {
    let cache = InMemoryCache::new();
    let log = InMemoryJourneyLog::new();
    let repos = Repositories::new(
        InMemoryRelationalStore::new(),
        Arc::new(cache.clone()),
        Arc::new(log.clone()),
    );
    seed_default_statuses(&repos.order_statuses).await.unwrap();
    Fixture { repos, cache, log }
}

async fn status_id(f: &Fixture, order_type: OrderType, name: &str) -> EntityId {
    f.repos.statuses.by_name(order_type, name).await.unwrap().id
}

#[tokio::test]
async fn seeding_is_idempotent() {
    let f = fixture().await;
    assert_eq!(seed_default_statuses(&f.repos.order_statuses).await.unwrap(), 0);

    let open = f
        .repos
        .order_statuses
        .get_by_type_and_name(OrderType::DeliveryOrder, "open", false)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(open.order_type, "delivery_order");
    assert_eq!(open.sequence, 0);
    assert!(f.cache.contains(&CacheKey::by_pair("order_status", "delivery_order", "open")));
}

#[tokio::test]
async fn store_lookup_by_code() {
    let f = fixture().await;
    let mut uow = f.repos.begin().await.unwrap();
    let store = Store {
        store_code: "ST-01".to_string(),
        name: "Toko Maju".to_string(),
        ..Default::default()
    };
    f.repos.stores.insert(store, &mut uow).await.unwrap();
    uow.commit().await.unwrap();

    let found = f.repos.stores.get_by_store_code("ST-01", false).await.unwrap();
    assert_eq!(found.data.unwrap().name, "Toko Maju");

    let err = f.repos.stores.get_by_store_code("ST-99", false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn agent_lists_are_purged_on_insert() {
    let f = fixture().await;
    let agent_id = EntityId::new(5);

    let mut uow = f.repos.begin().await.unwrap();
    for name in ["Budi", "Sari"] {
        let salesman = Salesman {
            agent_id,
            name: name.to_string(),
            ..Default::default()
        };
        f.repos.salesmen.insert(salesman, &mut uow).await.unwrap();
    }
    let warehouse = Warehouse {
        agent_id,
        code: "WH-1".to_string(),
        is_main: true,
        ..Default::default()
    };
    f.repos.warehouses.insert(warehouse, &mut uow).await.unwrap();
    uow.commit().await.unwrap();

    let salesmen = f.repos.salesmen.get_by_agent_id(agent_id, false).await.unwrap();
    assert_eq!(salesmen.total, 2);
    let warehouses = f.repos.warehouses.get_by_agent_id(agent_id, false).await.unwrap();
    assert!(warehouses.data.unwrap()[0].is_main);

    let mut uow = f.repos.begin().await.unwrap();
    let third = Salesman {
        agent_id,
        name: "Tono".to_string(),
        ..Default::default()
    };
    f.repos.salesmen.insert(third, &mut uow).await.unwrap();
    uow.commit().await.unwrap();

    let salesmen = f.repos.salesmen.get_by_agent_id(agent_id, false).await.unwrap();
    assert_eq!(salesmen.total, 3);
}

#[tokio::test]
async fn master_data_writes_purge_composite_views() {
    let f = fixture().await;
    let detail_key = CacheKey::by_id("sales_order_detail", 1);
    f.cache
        .set(&detail_key, "{}".to_string(), SNAPSHOT_TTL)
        .await
        .unwrap();

    let mut uow = f.repos.begin().await.unwrap();
    let agent = Agent {
        name: "Agen Jaya".to_string(),
        ..Default::default()
    };
    f.repos.agents.insert(agent, &mut uow).await.unwrap();
    uow.commit().await.unwrap();

    assert!(!f.cache.contains(&detail_key));
}

#[tokio::test]
async fn sales_order_writes_are_journaled_with_status_names() {
    let f = fixture().await;
    let open = status_id(&f, OrderType::SalesOrder, OrderStatus::OPEN).await;
    let closed = status_id(&f, OrderType::SalesOrder, OrderStatus::CLOSED).await;

    let mut uow = f.repos.begin().await.unwrap();
    let order = SalesOrder {
        agent_id: EntityId::new(1),
        so_code: "SO-1".to_string(),
        order_status_id: open,
        journey: JourneyNote::new("created", ""),
        ..Default::default()
    };
    let created = f.repos.sales_orders.insert(order, &mut uow).await.unwrap();
    let id = created.data.unwrap().id;

    let patch = SalesOrder {
        order_status_id: closed,
        journey: JourneyNote::new("", "fully delivered"),
        ..Default::default()
    };
    f.repos.sales_orders.update_by_id(id, patch, &mut uow).await.unwrap();
    uow.commit().await.unwrap();

    let history = f.log.status_history("sales_order", id).await.unwrap();
    assert_eq!(history, vec!["open", "closed"]);

    let by_code = f.repos.sales_orders.get_by_so_code("SO-1", false).await.unwrap();
    assert_eq!(by_code.data.unwrap().order_status_id, closed);

    let by_agent = f
        .repos
        .sales_orders
        .get_by_agent_id(EntityId::new(1), true)
        .await
        .unwrap();
    assert_eq!(by_agent.total, 1);
    assert!(by_agent.data.is_none());

    let err = f
        .repos
        .delivery_orders
        .get_by_sales_order_id(id, false)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn catalog_checks_transitions() {
    let f = fixture().await;
    let open = status_id(&f, OrderType::SalesOrder, OrderStatus::OPEN).await;
    let partial = status_id(&f, OrderType::SalesOrder, OrderStatus::PARTIAL).await;
    let cancelled = status_id(&f, OrderType::SalesOrder, OrderStatus::CANCELLED).await;
    let shipped = status_id(&f, OrderType::DeliveryOrder, OrderStatus::SHIPPED).await;

    let next = f
        .repos
        .statuses
        .check_transition(OrderType::SalesOrder, open, partial)
        .await
        .unwrap();
    assert_eq!(next.name, "partial");

    let backwards = f
        .repos
        .statuses
        .check_transition(OrderType::SalesOrder, partial, open)
        .await
        .unwrap_err();
    assert!(matches!(backwards, DomainError::InvalidTransition { .. }));
    assert_eq!(backwards.kind(), ErrorKind::Conflict);

    let out_of_terminal = f
        .repos
        .statuses
        .check_transition(OrderType::SalesOrder, cancelled, partial)
        .await
        .unwrap_err();
    assert_eq!(out_of_terminal.kind(), ErrorKind::Conflict);

    let foreign = f
        .repos
        .statuses
        .check_transition(OrderType::SalesOrder, open, shipped)
        .await
        .unwrap_err();
    assert_eq!(foreign.kind(), ErrorKind::Unprocessable);
}

#[tokio::test]
async fn catalog_resolves_statuses_for_the_journal() {
    let f = fixture().await;
    let shipped = status_id(&f, OrderType::DeliveryOrder, OrderStatus::SHIPPED).await;

    let resolved = f.repos.statuses.resolve(shipped).await.unwrap();
    assert_eq!(resolved.name, "shipped");

    let by_name = f
        .repos
        .statuses
        .resolve_name("delivery_order", "shipped")
        .await
        .unwrap();
    assert_eq!(by_name.id, shipped);

    assert!(f.repos.statuses.resolve(EntityId::new(999)).await.is_err());
    assert!(f.repos.statuses.resolve_name("invoice", "open").await.is_err());
}
