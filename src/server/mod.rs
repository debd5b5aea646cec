//! HTTP hosting for the functions.
//!
//! Callable endpoints speak the callable protocol (`{"data": ...}` in,
//! `{"result": ...}` or `{"error": {...}}` out); the trigger endpoint receives
//! the created account as its `data` and only answers callers presenting the
//! trigger secret.

pub mod callable;

#[cfg(test)]
mod tests;

use crate::functions::{
    self, AuthUserEvent, CreateSuperAdminRequest, CreateSuperAdminResponse,
    CreateTestDataResponse, FunctionsError, FunctionsSettings,
};
use crate::FirebaseApp;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use callable::{callable_context, parse_data, require_trigger_secret, CallableResult};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<FirebaseApp>,
    pub settings: Arc<FunctionsSettings>,
}

impl AppState {
    pub fn new(app: FirebaseApp, settings: FunctionsSettings) -> Self {
        Self {
            app: Arc::new(app),
            settings: Arc::new(settings),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/createSuperAdmin", post(create_super_admin))
        .route("/createTestData", post(create_test_data))
        .route("/sendWelcomeEmail", post(send_welcome_email))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn create_super_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CallableResult<CreateSuperAdminResponse>>, FunctionsError> {
    let request: CreateSuperAdminRequest = parse_data(&body)?;
    // Bad input is rejected before the caller's token is checked.
    request.validate()?;
    let ctx = callable_context(&state, &headers).await?;
    let result = functions::create_super_admin(&state.app, &state.settings, &ctx, request).await?;
    Ok(Json(CallableResult { result }))
}

// The payload is ignored.
async fn create_test_data(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CallableResult<CreateTestDataResponse>>, FunctionsError> {
    let ctx = callable_context(&state, &headers).await?;
    let result = functions::create_test_data(&state.app, &ctx).await?;
    Ok(Json(CallableResult { result }))
}

async fn send_welcome_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CallableResult<()>>, FunctionsError> {
    require_trigger_secret(&state, &headers)?;
    let user: AuthUserEvent = parse_data(&body)?;
    functions::send_welcome_email(&state.app, &state.settings, &user).await?;
    Ok(Json(CallableResult { result: () }))
}
