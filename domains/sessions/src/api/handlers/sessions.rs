//! Session API handlers
//!
//! Implements:
//! - POST /auth/session   - Exchange an ID token for a session cookie
//! - GET /auth/me         - Return the authenticated principal
//! - DELETE /auth/session - Revoke the caller's sessions and clear the cookie

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use gatehouse_auth::{
    clear_session_cookie, session_cookie, AuthUser, CredentialKind, Principal,
};
use gatehouse_common::{Error, Result};
use serde::Serialize;
use serde_json::Value;

use crate::api::middleware::SessionsState;
use crate::domain::lifetime::resolve_session_duration;

/// Parsed body of `POST /auth/session`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSessionRequest {
    pub id_token: String,
    pub remember: bool,
}

impl CreateSessionRequest {
    /// Accept any JSON value: `idToken` must be a non-blank string,
    /// `remember` counts only when it is a boolean.
    pub fn from_json(body: &Value) -> Result<Self> {
        let id_token = body
            .get("idToken")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Validation("idToken is required".to_string()))?;

        let remember = body
            .get("remember")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Self {
            id_token: id_token.to_string(),
            remember,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_cookie: String,
    pub expires_at: DateTime<Utc>,
    pub user: Principal,
}

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub user: Principal,
}

/// POST /auth/session - Exchange an ID token for a session cookie
pub async fn create_session(
    State(state): State<SessionsState>,
    jar: CookieJar,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let request = match body {
        Ok(Json(value)) => CreateSessionRequest::from_json(&value)?,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::debug!(error = %rejection, "Session request body over the size limit");
            return Err(Error::PayloadTooLarge("Payload Too Large".to_string()));
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable session request body");
            return Err(Error::Validation("idToken is required".to_string()));
        }
    };

    let config = state.auth.config();
    let lifetime = resolve_session_duration(request.remember, config.session_max_age);
    let provider = state.auth.provider();

    let decoded = provider
        .verify_id_token(&request.id_token, true)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Session creation rejected: ID token verification failed");
            Error::Authentication("Invalid or expired identity token".to_string())
        })?;

    let cookie = provider
        .create_session_cookie(&request.id_token, lifetime)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, uid = %decoded.uid, "Session cookie creation failed");
            Error::Authentication("Invalid or expired identity token".to_string())
        })?;

    let expires_at = chrono::Duration::from_std(lifetime)
        .ok()
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or_else(|| Error::Internal("Session lifetime out of range".to_string()))?;

    tracing::info!(
        uid = %decoded.uid,
        remember = request.remember,
        lifetime_secs = lifetime.as_secs(),
        "Session created"
    );

    let jar = jar.add(session_cookie(
        cookie.clone(),
        lifetime,
        config.secure_cookies,
    ));

    let response = CreateSessionResponse {
        session_cookie: cookie,
        expires_at,
        user: Principal::from_decoded(decoded, CredentialKind::IdToken),
    };

    Ok((StatusCode::CREATED, jar, Json(response)))
}

/// GET /auth/me - Return the authenticated principal
pub async fn current_user(AuthUser(auth_context): AuthUser) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        user: auth_context.principal,
    })
}

/// DELETE /auth/session - Revoke every session of the caller
pub async fn revoke_session(
    State(state): State<SessionsState>,
    AuthUser(auth_context): AuthUser,
    jar: CookieJar,
) -> Result<impl IntoResponse> {
    let uid = auth_context.uid();

    state
        .auth
        .provider()
        .revoke_refresh_tokens(uid)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, uid = %uid, "Failed to revoke refresh tokens");
            Error::Internal("Unable to revoke session".to_string())
        })?;

    tracing::info!(uid = %uid, "Session revoked");

    let jar = jar.add(clear_session_cookie(state.auth.config().secure_cookies));

    Ok((StatusCode::NO_CONTENT, jar))
}
