//! OAuth2 access tokens for the Identity Toolkit admin API.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{FirebaseEndpoints, ServiceAccount};
use crate::IdentityError;

const SCOPES: &str =
    "https://www.googleapis.com/auth/cloud-platform https://www.googleapis.com/auth/identitytoolkit";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const GRANT_LIFETIME_SECS: i64 = 3600;
/// Tokens are replaced this long before they expire
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Serialize)]
struct GrantClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Where access tokens come from.
#[derive(Clone)]
enum TokenSource {
    /// Signed JWT-bearer grant from a service account key
    ServiceAccount(ServiceAccount),
    /// Compute metadata server (application default credentials)
    Metadata,
}

#[derive(Clone)]
pub(crate) struct AccessTokens {
    http: reqwest::Client,
    source: TokenSource,
    token_uri: String,
    metadata_token_uri: String,
    cache: Arc<RwLock<Option<CachedToken>>>,
}

impl AccessTokens {
    pub(crate) fn new(
        http: reqwest::Client,
        service_account: Option<ServiceAccount>,
        endpoints: &FirebaseEndpoints,
    ) -> Self {
        let source = match service_account {
            Some(account) => TokenSource::ServiceAccount(account),
            None => TokenSource::Metadata,
        };

        Self {
            http,
            source,
            token_uri: endpoints.token_uri.clone(),
            metadata_token_uri: endpoints.metadata_token_uri.clone(),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Current access token, fetching a new one when the cached token is stale.
    pub(crate) async fn access_token(&self) -> Result<String, IdentityError> {
        let now = Utc::now();

        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(cached.value.clone());
            }
        }

        let fresh = self.fetch().await?;
        let value = fresh.value.clone();
        *self.cache.write().await = Some(fresh);

        Ok(value)
    }

    async fn fetch(&self) -> Result<CachedToken, IdentityError> {
        let request = match &self.source {
            TokenSource::ServiceAccount(account) => {
                let assertion = self.sign_grant(account)?;
                self.http.post(&self.token_uri).form(&[
                    ("grant_type", JWT_BEARER_GRANT),
                    ("assertion", assertion.as_str()),
                ])
            }
            TokenSource::Metadata => self
                .http
                .get(&self.metadata_token_uri)
                .header("Metadata-Flavor", "Google"),
        };

        let response = request
            .send()
            .await
            .map_err(|e| IdentityError::Request(format!("access token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(IdentityError::Response(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Response(format!("malformed access token: {}", e)))?;

        tracing::debug!(expires_in = token.expires_in, "Obtained identity admin access token");

        Ok(CachedToken {
            value: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }

    fn sign_grant(&self, account: &ServiceAccount) -> Result<String, IdentityError> {
        let now = Utc::now().timestamp();
        let claims = GrantClaims {
            iss: &account.client_email,
            scope: SCOPES,
            aud: &self.token_uri,
            iat: now,
            exp: now + GRANT_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes()).map_err(|e| {
            IdentityError::Configuration(format!("invalid service account private key: {}", e))
        })?;

        encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(|e| {
            IdentityError::Configuration(format!("failed to sign service account grant: {}", e))
        })
    }
}
