//! Gatehouse application composition root
//!
//! Composes the domain routers, infrastructure routes and HTTP layers
//! into a single application.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    http::{header, HeaderValue, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use gatehouse_auth::{AuthBackend, AuthConfig};
use gatehouse_common::{Config, Error};
use gatehouse_greetings::GreetingsState;
use gatehouse_identity::IdentityProvider;
use gatehouse_sessions::SessionsState;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    limit::RequestBodyLimitLayer, map_response_body::MapResponseBodyLayer,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

/// Largest accepted request body
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Create the main application router with all routes and middleware
pub fn create_app(config: &Config, provider: Arc<dyn IdentityProvider>) -> Router {
    let auth = AuthBackend::new(provider, AuthConfig::from(config));

    let sessions_state = SessionsState::new(auth.clone());
    let greetings_state = GreetingsState::new(auth);

    let started = Instant::now();

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(move || health_check(started)))
        .merge(gatehouse_sessions::routes(&sessions_state).with_state(sessions_state))
        .merge(gatehouse_greetings::routes(&greetings_state).with_state(greetings_state))
        .fallback(not_found);

    with_http_layers(app)
}

/// Wrap `router` in the shared HTTP layers.
pub fn with_http_layers(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("SAMEORIGIN"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::REFERRER_POLICY,
                HeaderValue::from_static("no-referrer"),
            ))
            .layer(CompressionLayer::new())
            .layer(MapResponseBodyLayer::new(Body::new))
            .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
            .into_inner(),
    )
}

async fn index() -> Json<Value> {
    Json(json!({
        "status": "running",
        "endpoints": {
            "health": "/health",
            "hello": "/hello",
            "auth": "/auth",
        }
    }))
}

/// Health check endpoint
async fn health_check(started: Instant) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime": started.elapsed().as_secs_f64(),
        "timestamp": Utc::now(),
    }))
}

async fn not_found(uri: Uri) -> Response {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not Found", "path": uri.path() })),
    )
        .into_response()
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Unhandled error");

    Error::Internal("Internal Server Error".to_string()).into_response()
}
