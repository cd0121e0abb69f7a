//! Greeting API handlers
//!
//! Implements:
//! - GET /hello          - Greet `?name=` or the world
//! - GET /hello/secure   - Greet the authenticated principal
//! - GET /hello/personal - Greet the principal when one is present

use axum::{
    extract::{rejection::QueryRejection, Query},
    Json,
};
use gatehouse_auth::{AuthUser, MaybeAuthUser};
use serde::Serialize;

const DEFAULT_NAME: &str = "world";

#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SecureHelloResponse {
    pub message: String,
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PersonalHelloResponse {
    pub message: String,
    pub authenticated: bool,
}

fn greeting(target: &str) -> String {
    format!("Hello, {}!", target)
}

/// GET /hello - Greet `?name=` or the world
///
/// A repeated `name` parameter greets its first value.
pub async fn hello(
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Json<HelloResponse> {
    let name = query.ok().and_then(|Query(pairs)| {
        pairs
            .into_iter()
            .find_map(|(key, value)| (key == "name").then_some(value))
    });
    let target = name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_NAME);

    Json(HelloResponse {
        message: greeting(target),
    })
}

/// GET /hello/secure - Greet the authenticated principal
pub async fn hello_secure(AuthUser(auth_context): AuthUser) -> Json<SecureHelloResponse> {
    let principal = auth_context.principal;

    Json(SecureHelloResponse {
        message: greeting(principal.display_name()),
        uid: principal.uid,
        email: principal.email,
    })
}

/// GET /hello/personal - Greet the principal when one is present
pub async fn hello_personal(
    MaybeAuthUser(auth_context): MaybeAuthUser,
) -> Json<PersonalHelloResponse> {
    let response = match auth_context {
        Some(context) => PersonalHelloResponse {
            message: greeting(context.principal.display_name()),
            authenticated: true,
        },
        None => PersonalHelloResponse {
            message: greeting(DEFAULT_NAME),
            authenticated: false,
        },
    };

    Json(response)
}
