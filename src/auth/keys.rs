use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

/// JWKS for the keys that sign Firebase ID tokens.
pub const SECURE_TOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const DEFAULT_MAX_AGE_SECS: u64 = 3600;

/// Shortest gap between refetches triggered by an unknown `kid`.
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum KeyFetchError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Key fetch failed with status {0}")]
    BadStatus(reqwest::StatusCode),
    #[error("No public key with kid {0}")]
    KeyNotFound(String),
    #[error("Invalid public key: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
    expires_at: Instant,
}

/// Fetches and caches the public signing keys, honouring `Cache-Control: max-age`.
pub struct PublicKeyManager {
    client: Client,
    url: String,
    cache: Arc<RwLock<Option<CachedKeys>>>,
}

impl PublicKeyManager {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, KeyFetchError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = &*cache {
                if Instant::now() < cached.expires_at {
                    if let Some(jwk) = cached.keys.find(kid) {
                        return Ok(DecodingKey::from_jwk(jwk)?);
                    }
                    if cached.fetched_at.elapsed() < MIN_REFETCH_INTERVAL {
                        return Err(KeyFetchError::KeyNotFound(kid.to_string()));
                    }
                }
            }
        }

        // Unknown kid or stale cache: keys may have rotated.
        let keys = self.refresh_keys().await?;
        let jwk = keys
            .find(kid)
            .ok_or_else(|| KeyFetchError::KeyNotFound(kid.to_string()))?;
        Ok(DecodingKey::from_jwk(jwk)?)
    }

    async fn refresh_keys(&self) -> Result<JwkSet, KeyFetchError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(KeyFetchError::BadStatus(response.status()));
        }

        let max_age = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_MAX_AGE_SECS);

        let keys: JwkSet = response.json().await?;

        tracing::debug!(count = keys.keys.len(), max_age, "refreshed token signing keys");

        let mut cache = self.cache.write().await;
        let now = Instant::now();
        *cache = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: now,
            expires_at: now + Duration::from_secs(max_age),
        });

        Ok(keys)
    }
}

fn parse_max_age(cache_control: &str) -> Option<u64> {
    cache_control.split(',').find_map(|part| {
        part.trim()
            .strip_prefix("max-age=")
            .and_then(|v| v.parse::<u64>().ok())
    })
}
