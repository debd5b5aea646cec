use super::AppState;
use crate::auth::keys::KeyFetchError;
use crate::auth::verifier::TokenVerificationError;
use crate::functions::{AuthContext, CallableContext, FunctionsError, FunctionsErrorCode};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const BOOTSTRAP_TOKEN_HEADER: &str = "x-bootstrap-token";
pub const TRIGGER_SECRET_HEADER: &str = "x-trigger-secret";

#[derive(Debug, Deserialize)]
struct CallableRequest {
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Serialize)]
pub struct CallableResult<T> {
    pub result: T,
}

impl IntoResponse for FunctionsError {
    fn into_response(self) -> Response {
        let status = match self.code {
            FunctionsErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            FunctionsErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            FunctionsErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
            FunctionsErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({
            "error": {
                "status": self.code.status(),
                "message": self.message,
            }
        });
        (status, Json(body)).into_response()
    }
}

/// Extracts `data` from a callable request body into `T`.
///
/// An empty body or a missing/`null` `data` is treated as `{}`.
pub fn parse_data<T: DeserializeOwned>(body: &[u8]) -> Result<T, FunctionsError> {
    let data = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice::<CallableRequest>(body)
            .map_err(|e| FunctionsError::invalid_argument(format!("Bad request body: {}", e)))?
            .data
    };

    let data = if data.is_null() { json!({}) } else { data };

    serde_json::from_value(data)
        .map_err(|e| FunctionsError::invalid_argument(format!("Invalid data: {}", e)))
}

/// Builds the request context from the `Authorization` and bootstrap headers.
///
/// A missing `Authorization` header means an anonymous caller; a present but
/// unverifiable one is rejected.
pub async fn callable_context(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<CallableContext, FunctionsError> {
    let auth = match bearer_token(headers)? {
        None => None,
        Some(token) => {
            let claims = state.app.verifier().verify_id_token(token).await.map_err(|e| {
                tracing::warn!(error = %e, "rejected ID token");
                match e {
                    TokenVerificationError::KeyFetchError(
                        KeyFetchError::NetworkError(_) | KeyFetchError::BadStatus(_),
                    ) => FunctionsError::new(
                        FunctionsErrorCode::Internal,
                        "Failed to verify ID token",
                    ),
                    _ => FunctionsError::unauthenticated("Invalid ID token"),
                }
            })?;
            Some(AuthContext::from(claims))
        }
    };

    let bootstrap_token = headers
        .get(BOOTSTRAP_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Ok(CallableContext {
        auth,
        bootstrap_token,
    })
}

/// Admits only the platform's trigger delivery, identified by the shared
/// trigger secret.
pub fn require_trigger_secret(state: &AppState, headers: &HeaderMap) -> Result<(), FunctionsError> {
    if !state.settings.trigger_enabled() {
        tracing::warn!("trigger call rejected: no trigger secret configured");
        return Err(FunctionsError::permission_denied(
            "Trigger endpoint is not enabled",
        ));
    }

    let Some(presented) = headers
        .get(TRIGGER_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        return Err(FunctionsError::unauthenticated("Missing trigger secret"));
    };

    if !state.settings.trigger_secret_matches(presented) {
        tracing::warn!("trigger call rejected: wrong trigger secret");
        return Err(FunctionsError::permission_denied("Invalid trigger secret"));
    }

    Ok(())
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, FunctionsError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or_else(|| FunctionsError::unauthenticated("Malformed Authorization header"))
}
