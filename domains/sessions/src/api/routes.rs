//! Route definitions for Sessions domain API

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use gatehouse_auth::require_auth;

use super::handlers::sessions;
use super::middleware::SessionsState;

/// Routes that accept anonymous callers
fn public_routes() -> Router<SessionsState> {
    Router::new().route("/auth/session", post(sessions::create_session))
}

/// Routes behind mandatory authentication
fn protected_routes(state: &SessionsState) -> Router<SessionsState> {
    Router::new()
        .route("/auth/me", get(sessions::current_user))
        .route("/auth/session", delete(sessions::revoke_session))
        .route_layer(from_fn_with_state(state.auth.clone(), require_auth))
}

/// Create all Sessions domain API routes
pub fn routes(state: &SessionsState) -> Router<SessionsState> {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state))
}
