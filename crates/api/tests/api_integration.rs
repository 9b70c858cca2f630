//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::AppState;
use api::config::Config;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::EntityId;
use domain::{Agent, DeliveryOrder, OrderType, SalesOrder, Store};
use metrics_exporter_prometheus::PrometheusHandle;
use repository::{InMemoryRelationalStore, JourneyNote};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct Seeded {
    sales_order_id: EntityId,
    delivery_order_id: EntityId,
}

async fn setup() -> (axum::Router, Arc<AppState<InMemoryRelationalStore>>) {
    let state = api::in_memory_state(&Config::default()).await.unwrap();
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn seed(state: &AppState<InMemoryRelationalStore>) -> Seeded {
    let repos = state.aggregator.repositories();
    let so_open = repos.statuses.by_name(OrderType::SalesOrder, "open").await.unwrap();
    let do_open = repos.statuses.by_name(OrderType::DeliveryOrder, "open").await.unwrap();

    let mut uow = repos.begin().await.unwrap();
    let agent = Agent {
        name: "North Agency".to_string(),
        ..Default::default()
    };
    let agent_id = repos.agents.insert(agent, &mut uow).await.unwrap().into_data().unwrap().id;
    let outlet = Store {
        store_code: "ST-01".to_string(),
        name: "Corner Shop".to_string(),
        ..Default::default()
    };
    let store_id = repos.stores.insert(outlet, &mut uow).await.unwrap().into_data().unwrap().id;
    let order = SalesOrder {
        agent_id,
        store_id,
        order_status_id: so_open.id,
        so_code: "SO-1".to_string(),
        journey: JourneyNote::new("placed", ""),
        ..Default::default()
    };
    let sales_order_id = repos
        .sales_orders
        .insert(order, &mut uow)
        .await
        .unwrap()
        .into_data()
        .unwrap()
        .id;
    let delivery = DeliveryOrder {
        sales_order_id,
        agent_id,
        store_id,
        order_status_id: do_open.id,
        do_code: "DO-1".to_string(),
        ..Default::default()
    };
    let delivery_order_id = repos
        .delivery_orders
        .insert(delivery, &mut uow)
        .await
        .unwrap()
        .into_data()
        .unwrap()
        .id;
    uow.commit().await.unwrap();

    Seeded {
        sales_order_id,
        delivery_order_id,
    }
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup().await;

    let (status, json) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_sales_order_detail() {
    let (app, state) = setup().await;
    let seeded = seed(&state).await;

    let uri = format!("/sales-orders/{}", seeded.sales_order_id);
    let (status, json) = get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sales_order"]["so_code"], "SO-1");
    assert_eq!(json["status"]["name"], "open");
    assert_eq!(json["agent"]["name"], "North Agency");
    assert_eq!(json["store"]["store_code"], "ST-01");
    assert!(json["brand"].is_null());
}

#[tokio::test]
async fn test_delivery_order_detail() {
    let (app, state) = setup().await;
    let seeded = seed(&state).await;

    let uri = format!("/delivery-orders/{}", seeded.delivery_order_id);
    let (status, json) = get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["delivery_order"]["do_code"], "DO-1");
    assert_eq!(json["sales_order"]["so_code"], "SO-1");
    assert_eq!(json["status"]["order_type"], "delivery_order");
}

#[tokio::test]
async fn test_missing_order_is_404() {
    let (app, _) = setup().await;

    let (status, json) = get_json(app, "/sales-orders/404").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("sales_order"));
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected() {
    let (app, _) = setup().await;

    let (status, _) = get_json(app, "/delivery-orders/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sales_order_journeys() {
    let (app, state) = setup().await;
    let seeded = seed(&state).await;

    let uri = format!("/sales-orders/{}/journeys", seeded.sales_order_id);
    let (status, json) = get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    let events = json.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["status"], "open");
    assert_eq!(events[0]["remark"], "placed");
}

#[tokio::test]
async fn test_journeys_of_missing_order_is_404() {
    let (app, _) = setup().await;

    let (status, _) = get_json(app, "/delivery-orders/99/journeys").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, state) = setup().await;
    let seeded = seed(&state).await;
    let uri = format!("/sales-orders/{}", seeded.sales_order_id);
    get_json(app.clone(), &uri).await;

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("aggregator_lookups_total"));
}
