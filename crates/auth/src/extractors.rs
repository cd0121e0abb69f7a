//! Axum extractors for authentication
//!
//! These read the [`AuthContext`] placed in request extensions by the
//! middleware in [`crate::middleware`]; they never contact the provider.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::context::AuthContext;
use crate::error::AuthError;

/// Authenticated user extractor.
///
/// Rejects with 401 when no context is present, which only happens if
/// the route is not behind `require_auth`.
#[derive(Debug)]
pub struct AuthUser(pub AuthContext);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthUser)
            .ok_or(AuthError::MissingCredential)
    }
}

/// Optional authenticated user, for routes behind `optional_auth`
#[derive(Debug)]
pub struct MaybeAuthUser(pub Option<AuthContext>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<AuthContext>().cloned()))
    }
}
