//! Authentication middleware
//!
//! `require_auth` rejects requests without a valid credential;
//! `optional_auth` never rejects. Both place an [`AuthContext`] in the
//! request extensions when verification succeeds, where the extractors
//! in this crate pick it up.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::backend::AuthBackend;
use crate::credential::extract_credential;
use crate::error::AuthError;

/// Mandatory authentication.
///
/// - 401 `Authentication required` when no credential is present
/// - 401 `Invalid or expired authentication token` when verification fails
pub async fn require_auth(
    State(backend): State<AuthBackend>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(credential) = extract_credential(req.headers()) else {
        return AuthError::MissingCredential.into_response();
    };

    let source = credential.source;
    match backend.authenticate(credential).await {
        Ok(context) => {
            tracing::debug!(uid = %context.uid(), source = %source, "Request authenticated");
            req.extensions_mut().insert(context);
            next.run(req).await
        }
        Err(failure) => {
            tracing::warn!(
                source = %source,
                id_token_error = %failure.id_token,
                session_cookie_error = %failure.session_cookie,
                "Authentication failed"
            );
            AuthError::InvalidCredential.into_response()
        }
    }
}

/// Best-effort authentication. Failures are logged and the request
/// continues anonymously.
pub async fn optional_auth(
    State(backend): State<AuthBackend>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(credential) = extract_credential(req.headers()) {
        let source = credential.source;
        match backend.authenticate(credential).await {
            Ok(context) => {
                req.extensions_mut().insert(context);
            }
            Err(failure) => {
                tracing::debug!(
                    source = %source,
                    id_token_error = %failure.id_token,
                    session_cookie_error = %failure.session_cookie,
                    "Optional authentication failed, continuing anonymously"
                );
            }
        }
    }

    next.run(req).await
}
