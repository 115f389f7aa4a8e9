//! Router-level tests for the gateway.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use clubhouse_config::DatabaseConfig;
use clubhouse_database::initialize_database;
use clubhouse_gateway::{create_router, GatewayState};

async fn test_router() -> Router {
    let config = DatabaseConfig {
        url: "sqlite://:memory:".to_string(),
        max_connections: 1,
    };

    let pool = initialize_database(&config)
        .await
        .expect("initialize test database");

    create_router(GatewayState::new(pool))
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let router = test_router().await;

    let response = router
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let router = test_router().await;

    let response = router
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn websocket_route_requires_upgrade() {
    let router = test_router().await;

    // A plain GET without the upgrade headers is rejected, not routed to
    // a handler panic
    let response = router
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/ws")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::OK);
}
