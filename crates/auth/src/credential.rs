//! Credential extraction from request headers
//!
//! Sources are tried in a fixed order: `Authorization: Bearer`, the
//! `X-Firebase-Auth` header, then the session cookie. Finding nothing
//! is a normal outcome for anonymous requests.

use std::fmt;

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap,
};

use crate::cookies::SESSION_COOKIE_NAME;

/// Custom header carrying a raw token
pub const CUSTOM_TOKEN_HEADER: &str = "x-firebase-auth";

/// Where a credential was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Header,
    Custom,
    Cookie,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Header => write!(f, "header"),
            CredentialSource::Custom => write!(f, "custom"),
            CredentialSource::Cookie => write!(f, "cookie"),
        }
    }
}

/// Candidate credential for one request
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub source: CredentialSource,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

/// Find at most one credential in `headers`.
pub fn extract_credential(headers: &HeaderMap) -> Option<Credential> {
    if let Some(token) = bearer_token(headers) {
        return Some(Credential {
            token,
            source: CredentialSource::Header,
        });
    }

    if let Some(token) = custom_header_token(headers) {
        return Some(Credential {
            token,
            source: CredentialSource::Custom,
        });
    }

    session_cookie(headers).map(|token| Credential {
        token,
        source: CredentialSource::Cookie,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();

    let scheme = parts.next()?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = parts.collect::<Vec<_>>().join(" ");
    (!token.is_empty()).then_some(token)
}

fn custom_header_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CUSTOM_TOKEN_HEADER)?.to_str().ok()?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let joined = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    cookie_value(&joined, SESSION_COOKIE_NAME).filter(|value| !value.is_empty())
}

/// Look up `name` in a raw `Cookie` header.
///
/// Segments without `=` are skipped, everything after the first `=` is
/// the value, and the last occurrence of a name wins. Values are
/// percent-decoded; undecodable values are returned as-is.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|segment| segment.trim().split_once('='))
        .filter(|(key, _)| key.trim() == name)
        .last()
        .map(|(_, raw)| match urlencoding::decode(raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        })
}
