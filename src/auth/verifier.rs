use crate::auth::keys::{KeyFetchError, PublicKeyManager, SECURE_TOKEN_JWKS_URL};
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const AUTH_TIME_SKEW_SECS: i64 = 300;

#[derive(Error, Debug)]
pub enum TokenVerificationError {
    #[error("Key fetch error: {0}")]
    KeyFetchError(#[from] KeyFetchError),
    #[error("JWT validation error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Claims carried by a Firebase ID token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub aud: String,
    pub iss: String,
    pub sub: String,
    pub exp: u64,
    pub iat: u64,
    pub auth_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub claims: serde_json::Map<String, serde_json::Value>,
}

/// Verifies ID tokens presented by callers of the callable endpoints.
pub struct IdTokenVerifier {
    project_id: String,
    key_manager: PublicKeyManager,
}

impl IdTokenVerifier {
    pub fn new(project_id: String) -> Self {
        Self::new_with_keys_url(project_id, SECURE_TOKEN_JWKS_URL)
    }

    pub fn new_with_keys_url(project_id: String, keys_url: impl Into<String>) -> Self {
        Self {
            project_id,
            key_manager: PublicKeyManager::new(Client::new(), keys_url),
        }
    }

    pub async fn verify_id_token(&self, token: &str) -> Result<IdTokenClaims, TokenVerificationError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(TokenVerificationError::InvalidToken(format!(
                "Unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| TokenVerificationError::InvalidToken("Missing kid in header".to_string()))?;

        let key = self.key_manager.get_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{}", self.project_id)]);

        let claims = decode::<IdTokenClaims>(token, &key, &validation)?.claims;

        if claims.sub.is_empty() {
            return Err(TokenVerificationError::InvalidToken(
                "Subject (sub) claim must not be empty".to_string(),
            ));
        }

        let now = chrono::Utc::now().timestamp();
        if i64::try_from(claims.auth_time).unwrap_or(i64::MAX) > now + AUTH_TIME_SKEW_SECS {
            return Err(TokenVerificationError::InvalidToken(
                "Auth time is in the future".to_string(),
            ));
        }

        Ok(claims)
    }
}
