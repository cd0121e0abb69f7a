//! Concrete authentication backend
//!
//! Wraps the identity provider plus `AuthConfig`. A credential is tried
//! as an ID token first and as a session cookie second, both with the
//! revocation check enabled.

use std::sync::Arc;

use gatehouse_identity::{DecodedToken, IdentityError, IdentityProvider};

use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::credential::Credential;
use crate::principal::{CredentialKind, Principal};

/// Successful verification and the kind that accepted the credential
#[derive(Debug, Clone)]
pub struct VerifiedCredential {
    pub decoded: DecodedToken,
    pub kind: CredentialKind,
}

/// Both verification attempts failed
#[derive(Debug)]
pub struct VerificationFailure {
    pub id_token: IdentityError,
    pub session_cookie: IdentityError,
}

/// Concrete authentication backend.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthBackend {
    provider: Arc<dyn IdentityProvider>,
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(provider: Arc<dyn IdentityProvider>, config: AuthConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify `token` as an ID token, falling back to a session cookie.
    pub async fn verify_credential(
        &self,
        token: &str,
    ) -> Result<VerifiedCredential, VerificationFailure> {
        let id_token = match self.provider.verify_id_token(token, true).await {
            Ok(decoded) => {
                return Ok(VerifiedCredential {
                    decoded,
                    kind: CredentialKind::IdToken,
                })
            }
            Err(e) => e,
        };

        tracing::debug!(error = %id_token, "ID token verification failed, trying session cookie");

        match self.provider.verify_session_cookie(token, true).await {
            Ok(decoded) => Ok(VerifiedCredential {
                decoded,
                kind: CredentialKind::SessionCookie,
            }),
            Err(session_cookie) => {
                tracing::debug!(error = %session_cookie, "Session cookie verification failed");
                Err(VerificationFailure {
                    id_token,
                    session_cookie,
                })
            }
        }
    }

    /// Verify an extracted credential and build the request context.
    pub async fn authenticate(
        &self,
        credential: Credential,
    ) -> Result<AuthContext, VerificationFailure> {
        let verified = self.verify_credential(&credential.token).await?;
        let principal = Principal::from_decoded(verified.decoded, verified.kind);

        Ok(AuthContext::new(
            principal,
            credential.token,
            credential.source,
        ))
    }
}
