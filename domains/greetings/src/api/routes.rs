//! Route definitions for Greetings domain API

use axum::{middleware::from_fn_with_state, routing::get, Router};
use gatehouse_auth::{optional_auth, require_auth};

use super::handlers::hello;
use super::middleware::GreetingsState;

/// Create all Greetings domain API routes
pub fn routes(state: &GreetingsState) -> Router<GreetingsState> {
    let public = Router::new().route("/hello", get(hello::hello));

    let secure = Router::new()
        .route("/hello/secure", get(hello::hello_secure))
        .route_layer(from_fn_with_state(state.auth.clone(), require_auth));

    let personal = Router::new()
        .route("/hello/personal", get(hello::hello_personal))
        .route_layer(from_fn_with_state(state.auth.clone(), optional_auth));

    public.merge(secure).merge(personal)
}
