//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::TimeDelta;
use http_body_util::BodyExt;
use stockroom_inventory::application::command_handlers::AddStockHandler;
use stockroom_inventory::domain::entities::{Product, Tenant};
use stockroom_inventory::domain::value_objects::StockQuantity;
use stockroom_store::memory::InMemoryUnitOfWork;
use stockroom_test_support::{FixedClock, RecordingNotificationSink};
use tower::ServiceExt;

use stockroom_api::state::AppState;

/// Seeds an active tenant and one of its products.
pub fn seed(store: &InMemoryUnitOfWork, tenant_id: &str, max_stock: u64, product_id: &str, stock: u64) {
    store.insert_tenant(Tenant {
        id: tenant_id.to_owned(),
        name: format!("Tenant {tenant_id}"),
        max_stock: StockQuantity::from_units(max_stock),
        is_active: true,
    });
    store.insert_product(Product::new(
        product_id,
        format!("Product {product_id}"),
        tenant_id,
        StockQuantity::from_units(stock),
        FixedClock::standard().0 - TimeDelta::hours(1),
    ));
}

/// Build the full app router over `store` with a fixed clock. Uses the same
/// route structure as `main.rs`.
pub fn build_test_app(store: InMemoryUnitOfWork, sink: Arc<RecordingNotificationSink>) -> Router {
    let clock = Arc::new(FixedClock::standard());
    let handler = AddStockHandler::new(Arc::new(store), sink, clock.clone());
    let app_state = AppState::new(Arc::new(handler), clock, Duration::from_secs(5));

    stockroom_api::app(app_state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
