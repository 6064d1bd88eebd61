//! Statement search API over the seeded in-memory backend

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use finova::web::{statements_router, StatementState};
use finova_store::{seed, SimStorageBackend};
use serde_json::Value;
use tower::ServiceExt;

async fn app() -> Router {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").try_init();

    let backend = SimStorageBackend::new();
    seed::seed_statements(&backend).await.unwrap();
    statements_router(StatementState::new(Arc::new(backend)))
}

async fn get_json(app: &Router, uri: &str) -> Vec<Value> {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "GET {uri}");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_list_with_and_without_trailing_slash() {
    let app = app().await;
    assert_eq!(get_json(&app, "/api/statements").await.len(), 12);
    assert_eq!(get_json(&app, "/api/statements/").await.len(), 12);
}

#[tokio::test]
async fn test_json_shape() {
    let app = app().await;
    let all = get_json(&app, "/api/statements").await;
    let first = &all[0];

    assert!(first["id"].is_string());
    assert_eq!(first["accountNumber"], "4532-1234-5678-9012");
    assert_eq!(first["customerName"], "John Smith");
    assert_eq!(first["transactionType"], "DEBIT");
    assert_eq!(first["merchantName"], "Amazon");
    assert_eq!(first["transactionDate"], "2025-01-15T10:30:00Z");
    assert_eq!(first["categories"], serde_json::json!(["shopping", "online"]));
}

#[tokio::test]
async fn test_search_filters() {
    let app = app().await;

    let smith = get_json(&app, "/api/statements/search?customerName=smith").await;
    assert_eq!(smith.len(), 3);

    let credits = get_json(
        &app,
        "/api/statements/search?customerName=emily&transactionType=CREDIT",
    )
    .await;
    assert_eq!(credits.len(), 1);
    assert_eq!(credits[0]["merchantName"], "HealthCare Solutions Corp");

    let by_date = get_json(&app, "/api/statements/search?transactionDate=2025-01-16").await;
    assert_eq!(by_date.len(), 2);

    let blank = get_json(&app, "/api/statements/search?customerName=&merchantName=%20").await;
    assert_eq!(blank.len(), 12);
}

#[tokio::test]
async fn test_search_treats_operators_literally() {
    let app = app().await;

    for payload in [
        "%7B%22%24ne%22%3A%20null%7D",
        ".%2A",
        "%27%3B%20return%20true%3B%20var%20x%3D%27",
        "%25",
    ] {
        let uri = format!("/api/statements/search?customerName={payload}");
        assert!(get_json(&app, &uri).await.is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn test_healthz() {
    let app = app().await;
    let response = app
        .oneshot(
            Request::get("/api/statements/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}
