//! Mock Identity Provider Implementation
//!
//! Serves pre-registered tokens from memory and records every call for
//! test assertions. Thread-safe via `Arc<Mutex<>>`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use uuid::Uuid;

use crate::{DecodedToken, IdentityError, IdentityProvider};

/// A call received by the mock provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    VerifyIdToken { token: String, check_revoked: bool },
    VerifySessionCookie { cookie: String, check_revoked: bool },
    CreateSessionCookie { id_token: String, expires_in: Duration },
    RevokeRefreshTokens { uid: String },
}

#[derive(Debug, Default)]
struct MockState {
    id_tokens: HashMap<String, DecodedToken>,
    session_cookies: HashMap<String, DecodedToken>,
    revoked_uids: HashSet<String>,
    next_cookie: Option<String>,
    fail_session_creation: bool,
    fail_revocation: bool,
    calls: Vec<ProviderCall>,
}

/// Mock identity provider for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct MockIdentityProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockIdentityProvider {
    /// Create a mock provider that knows no tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as an ID token decoding to `decoded`.
    pub fn with_id_token(self, token: impl Into<String>, decoded: DecodedToken) -> Self {
        self.lock().id_tokens.insert(token.into(), decoded);
        self
    }

    /// Accept `cookie` as a session cookie decoding to `decoded`.
    pub fn with_session_cookie(self, cookie: impl Into<String>, decoded: DecodedToken) -> Self {
        self.lock().session_cookies.insert(cookie.into(), decoded);
        self
    }

    /// Value returned by the next `create_session_cookie` call.
    pub fn with_issued_cookie(self, cookie: impl Into<String>) -> Self {
        self.lock().next_cookie = Some(cookie.into());
        self
    }

    /// Make `create_session_cookie` fail.
    pub fn failing_session_creation(self) -> Self {
        self.lock().fail_session_creation = true;
        self
    }

    /// Make `revoke_refresh_tokens` fail.
    pub fn failing_revocation(self) -> Self {
        self.lock().fail_revocation = true;
        self
    }

    /// Return all recorded calls.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.clone()
    }

    /// Subjects passed to `revoke_refresh_tokens`, in call order.
    pub fn revocations(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                ProviderCall::RevokeRefreshTokens { uid } => Some(uid.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear recorded calls.
    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .expect("mock identity state poisoned by a prior test panic")
    }

    fn lookup(
        state: &MockState,
        table: &HashMap<String, DecodedToken>,
        credential: &str,
        check_revoked: bool,
    ) -> Result<DecodedToken, IdentityError> {
        let decoded = table
            .get(credential)
            .cloned()
            .ok_or_else(|| IdentityError::InvalidToken("unknown credential".to_string()))?;

        if check_revoked && state.revoked_uids.contains(&decoded.uid) {
            return Err(IdentityError::Revoked);
        }

        Ok(decoded)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn verify_id_token(
        &self,
        token: &str,
        check_revoked: bool,
    ) -> Result<DecodedToken, IdentityError> {
        let mut state = self.lock();
        state.calls.push(ProviderCall::VerifyIdToken {
            token: token.to_string(),
            check_revoked,
        });
        Self::lookup(&state, &state.id_tokens, token, check_revoked)
    }

    async fn verify_session_cookie(
        &self,
        cookie: &str,
        check_revoked: bool,
    ) -> Result<DecodedToken, IdentityError> {
        let mut state = self.lock();
        state.calls.push(ProviderCall::VerifySessionCookie {
            cookie: cookie.to_string(),
            check_revoked,
        });
        Self::lookup(&state, &state.session_cookies, cookie, check_revoked)
    }

    async fn create_session_cookie(
        &self,
        id_token: &str,
        expires_in: Duration,
    ) -> Result<String, IdentityError> {
        let mut state = self.lock();
        state.calls.push(ProviderCall::CreateSessionCookie {
            id_token: id_token.to_string(),
            expires_in,
        });

        if state.fail_session_creation {
            return Err(IdentityError::Response(
                "mock session creation failure".to_string(),
            ));
        }

        let decoded = state
            .id_tokens
            .get(id_token)
            .cloned()
            .ok_or_else(|| IdentityError::InvalidToken("unknown ID token".to_string()))?;

        let cookie = state
            .next_cookie
            .take()
            .unwrap_or_else(|| format!("mock-session-{}", Uuid::new_v4()));

        tracing::debug!(uid = %decoded.uid, "Mock identity: issued session cookie");
        state.session_cookies.insert(cookie.clone(), decoded);

        Ok(cookie)
    }

    async fn revoke_refresh_tokens(&self, uid: &str) -> Result<(), IdentityError> {
        let mut state = self.lock();
        state.calls.push(ProviderCall::RevokeRefreshTokens {
            uid: uid.to_string(),
        });

        if state.fail_revocation {
            return Err(IdentityError::Request(
                "mock revocation failure".to_string(),
            ));
        }

        state.revoked_uids.insert(uid.to_string());
        Ok(())
    }
}
