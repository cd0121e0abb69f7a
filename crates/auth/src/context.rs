//! Per-request authentication context

use crate::credential::CredentialSource;
use crate::principal::{CredentialKind, Principal};

/// Authentication result carried in request extensions
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal: Principal,
    /// Raw credential that was verified
    pub credential: String,
    pub source: CredentialSource,
}

impl AuthContext {
    pub fn new(principal: Principal, credential: String, source: CredentialSource) -> Self {
        Self {
            principal,
            credential,
            source,
        }
    }

    pub fn uid(&self) -> &str {
        &self.principal.uid
    }

    pub fn kind(&self) -> CredentialKind {
        self.principal.token_type
    }

    /// Whether the request authenticated with a session cookie
    pub fn is_session(&self) -> bool {
        self.kind() == CredentialKind::SessionCookie
    }
}
