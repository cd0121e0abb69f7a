//! Verified identity attached to a request

use chrono::{DateTime, Utc};
use gatehouse_identity::DecodedToken;
use serde::Serialize;

/// Which kind of credential produced a principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CredentialKind {
    #[serde(rename = "id")]
    IdToken,
    #[serde(rename = "session")]
    SessionCookie,
}

/// Authenticated principal as exposed to handlers and clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub token_type: CredentialKind,
    pub issued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub claims: serde_json::Map<String, serde_json::Value>,
}

impl Principal {
    pub fn from_decoded(decoded: DecodedToken, kind: CredentialKind) -> Self {
        Self {
            issued_at: DateTime::from_timestamp(decoded.issued_at, 0).unwrap_or_default(),
            expires_at: decoded
                .expires_at
                .and_then(|exp| DateTime::from_timestamp(exp, 0)),
            uid: decoded.uid,
            email: decoded.email,
            name: decoded.name,
            picture: decoded.picture,
            token_type: kind,
            claims: decoded.claims,
        }
    }

    /// Name used when greeting this principal: display name, then email, then uid.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}
