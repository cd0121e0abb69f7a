//! Gatehouse Identity Provider
//!
//! Client side of the third-party identity provider with support for:
//! - Firebase Authentication (JWKS token verification + Identity Toolkit admin API)
//! - Mock provider for testing and development
//!
//! Token cryptography and session storage live at the provider; this
//! crate only moves credentials to it and decodes what comes back.

pub mod firebase;
pub mod mock;
mod token;

use std::time::Duration;

use thiserror::Error;

pub use firebase::{FirebaseConfig, FirebaseEndpoints, FirebaseIdentityProvider, ServiceAccount};
pub use mock::{MockIdentityProvider, ProviderCall};
pub use token::DecodedToken;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Identity provider configuration error: {0}")]
    Configuration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has been revoked")]
    Revoked,

    #[error("User account is disabled")]
    UserDisabled,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Identity provider request error: {0}")]
    Request(String),

    #[error("Identity provider response error: {0}")]
    Response(String),
}

/// Operations the application needs from the identity provider.
///
/// Implementations must be safe for unlimited concurrent use; callers
/// share one instance across all requests.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a short-lived ID token.
    async fn verify_id_token(
        &self,
        token: &str,
        check_revoked: bool,
    ) -> Result<DecodedToken, IdentityError>;

    /// Verify a session cookie previously issued by `create_session_cookie`.
    async fn verify_session_cookie(
        &self,
        cookie: &str,
        check_revoked: bool,
    ) -> Result<DecodedToken, IdentityError>;

    /// Exchange an ID token for a session cookie valid for `expires_in`.
    async fn create_session_cookie(
        &self,
        id_token: &str,
        expires_in: Duration,
    ) -> Result<String, IdentityError>;

    /// Invalidate every refresh token and session issued to `uid`.
    async fn revoke_refresh_tokens(&self, uid: &str) -> Result<(), IdentityError>;
}

/// Identity provider configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Provider implementation (firebase, mock)
    pub provider: String,
    /// Firebase settings, required when `provider` is `firebase`
    pub firebase: Option<FirebaseConfig>,
}

impl IdentityConfig {
    /// Create identity config from environment variables
    pub fn from_env() -> Result<Self, IdentityError> {
        dotenvy::dotenv().ok();

        let provider =
            std::env::var("IDENTITY_PROVIDER").unwrap_or_else(|_| "firebase".to_string());

        let firebase = if provider == "firebase" {
            Some(FirebaseConfig::from_lookup(|key| std::env::var(key).ok())?)
        } else {
            None
        };

        Ok(Self { provider, firebase })
    }
}

/// Factory for creating IdentityProvider implementations.
pub struct IdentityProviderFactory;

impl IdentityProviderFactory {
    /// Create an IdentityProvider based on configuration.
    pub fn create(config: IdentityConfig) -> Result<Box<dyn IdentityProvider>, IdentityError> {
        match config.provider.as_str() {
            "firebase" => {
                let firebase = config.firebase.ok_or_else(|| {
                    IdentityError::Configuration(
                        "Firebase settings are required for the firebase provider".to_string(),
                    )
                })?;
                tracing::info!(project_id = %firebase.project_id, "Creating Firebase identity provider");
                if firebase.service_account.is_none() {
                    tracing::warn!(
                        "Firebase service account details missing; using application default credentials"
                    );
                }
                Ok(Box::new(FirebaseIdentityProvider::new(firebase)))
            }
            "mock" => {
                tracing::warn!("Creating mock identity provider; no real credentials will verify");
                Ok(Box::new(MockIdentityProvider::new()))
            }
            provider => Err(IdentityError::Configuration(format!(
                "Unknown identity provider: {}. Supported providers: firebase, mock",
                provider
            ))),
        }
    }
}
