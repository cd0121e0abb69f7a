//! Greeting endpoint integration tests

use axum::{body::Body, http::StatusCode};
use serde_json::json;

use crate::common::*;

#[tokio::test]
async fn test_public_hello() {
    let app = TestApp::new();

    let (status, body) = json_body(app.send(get("/hello").body(Body::empty()).unwrap()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Hello, world!" }));

    let request = get("/hello?name=%20%20Grace%20").body(Body::empty()).unwrap();
    let (_, body) = json_body(app.send(request).await).await;
    assert_eq!(body, json!({ "message": "Hello, Grace!" }));
}

#[tokio::test]
async fn test_public_hello_ignores_credentials() {
    let app = TestApp::new();

    let request = get("/hello")
        .header("authorization", bearer("forged"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = json_body(app.send(request).await).await;

    assert_eq!(status, StatusCode::OK);
    assert!(app.provider.calls().is_empty());
}

#[tokio::test]
async fn test_secure_hello() {
    let app = TestApp::new();

    let request = get("/hello/secure").body(Body::empty()).unwrap();
    let (status, body) = json_body(app.send(request).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Authentication required" }));

    let request = get("/hello/secure")
        .header("authorization", bearer(VALID_ID_TOKEN))
        .body(Body::empty())
        .unwrap();
    let (status, body) = json_body(app.send(request).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "message": format!("Hello, {}!", TEST_NAME),
            "uid": TEST_UID,
            "email": TEST_EMAIL,
        })
    );
}

#[tokio::test]
async fn test_personal_hello_anonymous() {
    let app = TestApp::new();

    let request = get("/hello/personal").body(Body::empty()).unwrap();
    let (status, body) = json_body(app.send(request).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Hello, world!", "authenticated": false })
    );
}
