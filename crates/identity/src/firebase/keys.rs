//! Public signing keys published by Firebase, cached per key set.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use tokio::sync::{Mutex, RwLock};

use crate::IdentityError;

/// Shortest gap between two fetches of the same key set.
pub(crate) const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Default)]
struct CachedKeys {
    keys: HashMap<String, Jwk>,
    refreshed_at: Option<Instant>,
}

/// JWKS endpoint plus an in-process cache of its keys.
///
/// A `kid` that is not cached triggers a refresh, which covers key
/// rotation on the provider side. Refreshes are serialized and happen at
/// most once per [`MIN_REFRESH_INTERVAL`]; unknown `kid`s inside that
/// window are rejected from the cache.
#[derive(Clone)]
pub(crate) struct KeySet {
    http: reqwest::Client,
    jwks_url: String,
    cache: Arc<RwLock<CachedKeys>>,
    refresh_lock: Arc<Mutex<()>>,
}

impl KeySet {
    pub(crate) fn new(http: reqwest::Client, jwks_url: impl Into<String>) -> Self {
        Self {
            http,
            jwks_url: jwks_url.into(),
            cache: Arc::new(RwLock::new(CachedKeys::default())),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Resolve the decoding key for `kid`, refreshing the cache on miss.
    pub(crate) async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, IdentityError> {
        let jwk = match self.cached(kid).await {
            Some(jwk) => jwk,
            None => self.refresh_for(kid).await?,
        };

        DecodingKey::from_jwk(&jwk)
            .map_err(|e| IdentityError::Response(format!("unusable signing key '{}': {}", kid, e)))
    }

    async fn cached(&self, kid: &str) -> Option<Jwk> {
        self.cache.read().await.keys.get(kid).cloned()
    }

    async fn refresh_for(&self, kid: &str) -> Result<Jwk, IdentityError> {
        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while this one waited.
        if let Some(jwk) = self.cached(kid).await {
            return Ok(jwk);
        }

        let recently_refreshed = self
            .cache
            .read()
            .await
            .refreshed_at
            .is_some_and(|at| at.elapsed() < MIN_REFRESH_INTERVAL);

        if recently_refreshed {
            tracing::debug!(kid = %kid, url = %self.jwks_url, "Unknown kid, refresh throttled");
        } else {
            self.refresh().await?;
        }

        self.cached(kid).await.ok_or_else(|| {
            IdentityError::InvalidToken(format!("no signing key for kid '{}'", kid))
        })
    }

    async fn refresh(&self) -> Result<(), IdentityError> {
        tracing::debug!(url = %self.jwks_url, "Refreshing signing keys");

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| IdentityError::Request(format!("failed to fetch signing keys: {}", e)))?;

        if !response.status().is_success() {
            return Err(IdentityError::Response(format!(
                "signing key endpoint returned {}",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| IdentityError::Response(format!("malformed signing keys: {}", e)))?;

        let keys: HashMap<String, Jwk> = jwks
            .keys
            .into_iter()
            .filter_map(|jwk| jwk.common.key_id.clone().map(|kid| (kid, jwk)))
            .collect();

        tracing::debug!(count = keys.len(), url = %self.jwks_url, "Signing keys cached");
        *self.cache.write().await = CachedKeys {
            keys,
            refreshed_at: Some(Instant::now()),
        };

        Ok(())
    }
}
