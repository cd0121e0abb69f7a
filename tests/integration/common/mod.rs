//! Common test utilities and fixtures for integration tests
//!
//! Provides:
//! - `TestApp`: the composed router backed by `MockIdentityProvider`
//! - Identity fixtures with known credentials
//! - Request builders and response decoding helpers

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use gatehouse_common::Config;
use gatehouse_identity::{DecodedToken, MockIdentityProvider};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_UID: &str = "user-123";
pub const TEST_EMAIL: &str = "user@example.com";
pub const TEST_NAME: &str = "Test User";

/// ID token the mock provider accepts for the test user
pub const VALID_ID_TOKEN: &str = "valid-id-token";
/// Session cookie the mock provider accepts for the test user
pub const VALID_SESSION_COOKIE: &str = "valid-session-cookie";
/// Cookie value handed out by `POST /auth/session`
pub const ISSUED_SESSION_COOKIE: &str = "issued-session-cookie";

pub const ONE_DAY_SECS: u64 = 24 * 60 * 60;
pub const SEVEN_DAYS_SECS: u64 = 7 * ONE_DAY_SECS;

/// Decoded token for the standard test user
pub fn test_user_token() -> DecodedToken {
    let now = chrono::Utc::now().timestamp();
    DecodedToken::new(TEST_UID, now)
        .with_email(TEST_EMAIL)
        .with_name(TEST_NAME)
        .with_expires_at(now + 3600)
}

/// Test application with its mock provider
pub struct TestApp {
    pub provider: MockIdentityProvider,
    pub config: Config,
}

impl TestApp {
    /// Development config (no Secure cookies), seven day maximum, standard credentials.
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Like `new`, with extra configuration variables.
    pub fn with_env(vars: &[(&str, &str)]) -> Self {
        let config = Config::from_lookup(|key| {
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        })
        .expect("test configuration must load");

        let provider = MockIdentityProvider::new()
            .with_id_token(VALID_ID_TOKEN, test_user_token())
            .with_session_cookie(VALID_SESSION_COOKIE, test_user_token())
            .with_issued_cookie(ISSUED_SESSION_COOKIE);

        Self { provider, config }
    }

    /// Replace the provider, e.g. with one configured to fail.
    pub fn with_provider(mut self, provider: MockIdentityProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn router(&self) -> Router {
        gatehouse_app::create_app(&self.config, Arc::new(self.provider.clone()))
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

pub fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

pub fn delete(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("DELETE").uri(uri)
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body must be readable")
        .to_vec()
}

pub async fn json_body(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = body_bytes(response).await;
    (
        status,
        serde_json::from_slice(&bytes).expect("body must be JSON"),
    )
}

/// All `Set-Cookie` header values on a response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok().map(str::to_string))
        .collect()
}

/// `Max-Age` attribute of a `Set-Cookie` value
pub fn max_age(set_cookie: &str) -> Option<Duration> {
    set_cookie
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("Max-Age="))
        .find_map(|secs| secs.parse().ok())
        .map(Duration::from_secs)
}
