//! Firebase Authentication client
//!
//! ID tokens and session cookies are RS256 JWTs checked against the
//! public keys Firebase publishes. Session issuance, revocation and the
//! revocation check go through the Identity Toolkit admin API.

mod credentials;
mod keys;

use std::time::Duration;

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DecodedToken, IdentityError, IdentityProvider};
use credentials::AccessTokens;
use keys::KeySet;

const MIN_SESSION_DURATION: Duration = Duration::from_secs(5 * 60);
const MAX_SESSION_DURATION: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Service account used to call the admin API.
#[derive(Clone)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Remote endpoints used by the client.
#[derive(Debug, Clone)]
pub struct FirebaseEndpoints {
    /// Identity Toolkit API base URL
    pub identity_toolkit: String,
    /// OAuth2 token endpoint for service account grants
    pub token_uri: String,
    /// Metadata server token endpoint (application default credentials)
    pub metadata_token_uri: String,
    /// JWKS for ID tokens
    pub id_token_jwks: String,
    /// JWKS for session cookies
    pub session_cookie_jwks: String,
}

impl Default for FirebaseEndpoints {
    fn default() -> Self {
        Self {
            identity_toolkit: "https://identitytoolkit.googleapis.com".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            metadata_token_uri: "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token".to_string(),
            id_token_jwks: "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com".to_string(),
            session_cookie_jwks: "https://identitytoolkit.googleapis.com/v1/sessionCookiePublicKeys".to_string(),
        }
    }
}

/// Firebase project configuration
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub project_id: String,
    /// Explicit service account; the metadata server is used when absent
    pub service_account: Option<ServiceAccount>,
    pub endpoints: FirebaseEndpoints,
}

impl FirebaseConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            service_account: None,
            endpoints: FirebaseEndpoints::default(),
        }
    }

    /// Read `FIREBASE_PROJECT_ID`, `FIREBASE_CLIENT_EMAIL` and `FIREBASE_PRIVATE_KEY`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IdentityError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let project_id = non_empty("FIREBASE_PROJECT_ID").ok_or_else(|| {
            IdentityError::Configuration("FIREBASE_PROJECT_ID is required".to_string())
        })?;

        // Keys pasted into env files carry literal "\n" sequences
        let service_account = match (
            non_empty("FIREBASE_CLIENT_EMAIL"),
            non_empty("FIREBASE_PRIVATE_KEY"),
        ) {
            (Some(client_email), Some(private_key)) => Some(ServiceAccount {
                client_email,
                private_key: private_key.replace("\\n", "\n"),
            }),
            _ => None,
        };

        Ok(Self {
            project_id,
            service_account,
            endpoints: FirebaseEndpoints::default(),
        })
    }

    fn id_token_issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    fn session_cookie_issuer(&self) -> String {
        format!("https://session.firebase.google.com/{}", self.project_id)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionCookieRequest<'a> {
    id_token: &'a str,
    valid_duration: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionCookieResponse {
    session_cookie: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    local_id: [&'a str; 1],
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    #[serde(default)]
    disabled: bool,
    /// Epoch seconds, serialized as a string
    valid_since: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RevokeRequest<'a> {
    local_id: &'a str,
    valid_since: String,
}

/// Firebase-backed identity provider.
#[derive(Clone)]
pub struct FirebaseIdentityProvider {
    config: FirebaseConfig,
    http: reqwest::Client,
    id_token_keys: KeySet,
    session_cookie_keys: KeySet,
    access_tokens: AccessTokens,
}

impl FirebaseIdentityProvider {
    pub fn new(config: FirebaseConfig) -> Self {
        let http = reqwest::Client::new();
        let id_token_keys = KeySet::new(http.clone(), config.endpoints.id_token_jwks.clone());
        let session_cookie_keys =
            KeySet::new(http.clone(), config.endpoints.session_cookie_jwks.clone());
        let access_tokens = AccessTokens::new(
            http.clone(),
            config.service_account.clone(),
            &config.endpoints,
        );

        Self {
            config,
            http,
            id_token_keys,
            session_cookie_keys,
            access_tokens,
        }
    }

    async fn verify_jwt(
        &self,
        token: &str,
        keys: &KeySet,
        issuer: &str,
        check_revoked: bool,
    ) -> Result<DecodedToken, IdentityError> {
        let header = decode_header(token).map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(IdentityError::InvalidToken(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| IdentityError::InvalidToken("token has no 'kid' header".to_string()))?;
        let key = keys.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[&self.config.project_id]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);

        let data = decode::<Map<String, Value>>(token, &key, &validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let decoded = DecodedToken::from_claims(data.claims)?;

        if check_revoked {
            self.ensure_not_revoked(&decoded).await?;
        }

        Ok(decoded)
    }

    async fn ensure_not_revoked(&self, decoded: &DecodedToken) -> Result<(), IdentityError> {
        let lookup: LookupResponse = self
            .admin_post(
                "/accounts:lookup",
                &LookupRequest {
                    local_id: [decoded.uid.as_str()],
                },
            )
            .await?;

        let user = lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| IdentityError::UserNotFound(decoded.uid.clone()))?;

        if user.disabled {
            return Err(IdentityError::UserDisabled);
        }

        let valid_since = user
            .valid_since
            .as_deref()
            .and_then(|raw| raw.parse::<i64>().ok());
        let auth_time = decoded.auth_time().unwrap_or(decoded.issued_at);

        match valid_since {
            Some(valid_since) if auth_time < valid_since => Err(IdentityError::Revoked),
            _ => Ok(()),
        }
    }

    /// POST to `{identity_toolkit}/v1/projects/{project}{suffix}` with an admin token.
    async fn admin_post<B, R>(&self, suffix: &str, body: &B) -> Result<R, IdentityError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let access_token = self.access_tokens.access_token().await?;
        let url = format!(
            "{}/v1/projects/{}{}",
            self.config.endpoints.identity_toolkit.trim_end_matches('/'),
            self.config.project_id,
            suffix
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(IdentityError::Response(format!(
                "Identity Toolkit returned {}: {}",
                status, body
            )));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| IdentityError::Response(e.to_string()))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn verify_id_token(
        &self,
        token: &str,
        check_revoked: bool,
    ) -> Result<DecodedToken, IdentityError> {
        let issuer = self.config.id_token_issuer();
        self.verify_jwt(token, &self.id_token_keys, &issuer, check_revoked)
            .await
    }

    async fn verify_session_cookie(
        &self,
        cookie: &str,
        check_revoked: bool,
    ) -> Result<DecodedToken, IdentityError> {
        let issuer = self.config.session_cookie_issuer();
        self.verify_jwt(cookie, &self.session_cookie_keys, &issuer, check_revoked)
            .await
    }

    async fn create_session_cookie(
        &self,
        id_token: &str,
        expires_in: Duration,
    ) -> Result<String, IdentityError> {
        if expires_in < MIN_SESSION_DURATION || expires_in > MAX_SESSION_DURATION {
            return Err(IdentityError::InvalidArgument(format!(
                "session duration must be between 5 minutes and 14 days, got {}s",
                expires_in.as_secs()
            )));
        }

        let response: CreateSessionCookieResponse = self
            .admin_post(
                ":createSessionCookie",
                &CreateSessionCookieRequest {
                    id_token,
                    valid_duration: expires_in.as_secs(),
                },
            )
            .await?;

        Ok(response.session_cookie)
    }

    async fn revoke_refresh_tokens(&self, uid: &str) -> Result<(), IdentityError> {
        let _: Value = self
            .admin_post(
                "/accounts:update",
                &RevokeRequest {
                    local_id: uid,
                    valid_since: chrono::Utc::now().timestamp().to_string(),
                },
            )
            .await?;

        tracing::info!(uid = %uid, "Revoked refresh tokens");
        Ok(())
    }
}
