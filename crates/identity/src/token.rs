//! Decoded token returned by the identity provider

use serde::Serialize;
use serde_json::{Map, Value};

use crate::IdentityError;

/// A verified ID token or session cookie, as reported by the provider.
///
/// `claims` holds the full payload, including the fields that are
/// lifted into typed members.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedToken {
    /// Subject (provider user id), never empty
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    /// Issued at, epoch seconds
    pub issued_at: i64,
    /// Expires at, epoch seconds
    pub expires_at: Option<i64>,
    pub claims: Map<String, Value>,
}

impl DecodedToken {
    /// Build a token from a raw claim set.
    ///
    /// Fails when `sub` is missing or empty, or `iat` is not an integer.
    pub fn from_claims(mut claims: Map<String, Value>) -> Result<Self, IdentityError> {
        let uid = claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|sub| !sub.is_empty())
            .map(str::to_string)
            .ok_or_else(|| IdentityError::InvalidToken("token has no subject".to_string()))?;

        let issued_at = claims
            .get("iat")
            .and_then(Value::as_i64)
            .ok_or_else(|| IdentityError::InvalidToken("token has no issued-at".to_string()))?;

        let expires_at = claims.get("exp").and_then(Value::as_i64);

        claims
            .entry("uid")
            .or_insert_with(|| Value::String(uid.clone()));

        Ok(Self {
            email: string_claim(&claims, "email"),
            name: string_claim(&claims, "name"),
            picture: string_claim(&claims, "picture"),
            uid,
            issued_at,
            expires_at,
            claims,
        })
    }

    /// Create a minimal token for a subject.
    pub fn new(uid: impl Into<String>, issued_at: i64) -> Self {
        let uid = uid.into();
        let mut claims = Map::new();
        claims.insert("sub".to_string(), Value::String(uid.clone()));
        claims.insert("uid".to_string(), Value::String(uid.clone()));
        claims.insert("iat".to_string(), Value::from(issued_at));
        claims.insert("auth_time".to_string(), Value::from(issued_at));

        Self {
            uid,
            email: None,
            name: None,
            picture: None,
            issued_at,
            expires_at: None,
            claims,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        let email = email.into();
        self.claims
            .insert("email".to_string(), Value::String(email.clone()));
        self.email = Some(email);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.claims
            .insert("name".to_string(), Value::String(name.clone()));
        self.name = Some(name);
        self
    }

    pub fn with_expires_at(mut self, expires_at: i64) -> Self {
        self.claims
            .insert("exp".to_string(), Value::from(expires_at));
        self.expires_at = Some(expires_at);
        self
    }

    /// Add an arbitrary claim
    pub fn with_claim(mut self, key: impl Into<String>, value: Value) -> Self {
        self.claims.insert(key.into(), value);
        self
    }

    /// Time of the original sign-in, epoch seconds
    pub fn auth_time(&self) -> Option<i64> {
        self.claims.get("auth_time").and_then(Value::as_i64)
    }
}

fn string_claim(claims: &Map<String, Value>, key: &str) -> Option<String> {
    claims
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
