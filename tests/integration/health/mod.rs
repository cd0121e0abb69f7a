//! Infrastructure route integration tests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

use crate::common::*;

#[tokio::test]
async fn test_index() {
    let app = TestApp::new();

    let (status, body) = json_body(app.send(get("/").body(Body::empty()).unwrap()).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "running",
            "endpoints": { "health": "/health", "hello": "/hello", "auth": "/auth" }
        })
    );
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let (status, body) =
        json_body(app.send(get("/health").body(Body::empty()).unwrap()).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["uptime"].is_number());
    assert!(body["timestamp"]
        .as_str()
        .unwrap()
        .parse::<chrono::DateTime<chrono::Utc>>()
        .is_ok());
}

#[tokio::test]
async fn test_not_found() {
    let app = TestApp::new();

    let (status, body) =
        json_body(app.send(get("/missing").body(Body::empty()).unwrap()).await).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not Found", "path": "/missing" }));
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = TestApp::new();

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/auth/session")
        .header(header::ORIGIN, "https://app.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = TestApp::new();

    let payload = json!({ "idToken": "x".repeat(gatehouse_app::BODY_LIMIT_BYTES) }).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/auth/session")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, payload.len())
        .body(Body::from(payload))
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.provider.calls().is_empty());
}
