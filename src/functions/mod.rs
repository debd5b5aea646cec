//! The function bodies, independent of how they are hosted.
//!
//! Each function validates its input, checks the caller, then talks to the
//! identity provider and the document store in a fixed sequence. Failures
//! come back as a [`FunctionsError`] carrying one of four callable codes.

pub mod access;
pub mod models;
pub mod seed;
pub mod super_admin;
pub mod welcome;


pub use seed::{create_test_data, CreateTestDataResponse};
pub use super_admin::{create_super_admin, CreateSuperAdminRequest, CreateSuperAdminResponse};
pub use welcome::{send_welcome_email, AuthUserEvent};

use crate::auth::models::ActionCodeSettings;
use crate::auth::verifier::IdTokenClaims;
use crate::auth::AuthError;
use crate::firestore::FirestoreError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Error codes of the callable protocol used by these functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionsErrorCode {
    InvalidArgument,
    Unauthenticated,
    PermissionDenied,
    Internal,
}

impl FunctionsErrorCode {
    /// Client-facing code, e.g. `invalid-argument`.
    pub fn code(&self) -> &'static str {
        match self {
            FunctionsErrorCode::InvalidArgument => "invalid-argument",
            FunctionsErrorCode::Unauthenticated => "unauthenticated",
            FunctionsErrorCode::PermissionDenied => "permission-denied",
            FunctionsErrorCode::Internal => "internal",
        }
    }

    /// Wire status, e.g. `INVALID_ARGUMENT`.
    pub fn status(&self) -> &'static str {
        match self {
            FunctionsErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            FunctionsErrorCode::Unauthenticated => "UNAUTHENTICATED",
            FunctionsErrorCode::PermissionDenied => "PERMISSION_DENIED",
            FunctionsErrorCode::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for FunctionsErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A terminal failure of one function invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct FunctionsError {
    pub code: FunctionsErrorCode,
    pub message: String,
}

impl FunctionsError {
    pub fn new(code: FunctionsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::InvalidArgument, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::Unauthenticated, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::PermissionDenied, message)
    }

    /// An internal error for a failed backend call.
    ///
    /// The message is `context`, followed by the API's own reason when the
    /// backend answered with one. Transport and serialization details stay in
    /// the logs.
    pub fn upstream<E: UpstreamFailure>(context: &str, err: &E) -> Self {
        let message = match err.api_message() {
            Some(reason) => format!("{}: {}", context, reason),
            None => context.to_string(),
        };
        Self::new(FunctionsErrorCode::Internal, message)
    }
}

/// A backend client error that may carry an API-reported reason.
pub trait UpstreamFailure: fmt::Display {
    fn api_message(&self) -> Option<&str>;
}

impl UpstreamFailure for AuthError {
    fn api_message(&self) -> Option<&str> {
        AuthError::api_message(self)
    }
}

impl UpstreamFailure for FirestoreError {
    fn api_message(&self) -> Option<&str> {
        FirestoreError::api_message(self)
    }
}

/// The verified identity of a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub uid: String,
    pub email: Option<String>,
}

impl From<IdTokenClaims> for AuthContext {
    fn from(claims: IdTokenClaims) -> Self {
        Self {
            uid: claims.sub,
            email: claims.email,
        }
    }
}

/// Per-request information supplied by the transport.
#[derive(Debug, Clone, Default)]
pub struct CallableContext {
    pub auth: Option<AuthContext>,
    pub bootstrap_token: Option<String>,
}

impl CallableContext {
    pub fn authenticated(uid: &str) -> Self {
        Self {
            auth: Some(AuthContext {
                uid: uid.to_string(),
                email: None,
            }),
            bootstrap_token: None,
        }
    }
}

/// Deployment settings the functions read.
#[derive(Debug, Clone, Default)]
pub struct FunctionsSettings {
    bootstrap_token_digest: Option<[u8; 32]>,
    trigger_secret_digest: Option<[u8; 32]>,
    verification_continue_url: Option<Url>,
}

impl FunctionsSettings {
    /// An empty `bootstrap_token` disables bootstrapping.
    pub fn new(bootstrap_token: Option<&str>, verification_continue_url: Option<Url>) -> Self {
        Self {
            bootstrap_token_digest: digest_of(bootstrap_token),
            trigger_secret_digest: None,
            verification_continue_url,
        }
    }

    /// Sets the secret the trigger endpoint requires. Without one, the
    /// trigger endpoint rejects every call.
    pub fn with_trigger_secret(mut self, trigger_secret: Option<&str>) -> Self {
        self.trigger_secret_digest = digest_of(trigger_secret);
        self
    }

    pub fn bootstrap_enabled(&self) -> bool {
        self.bootstrap_token_digest.is_some()
    }

    pub fn bootstrap_token_matches(&self, presented: &str) -> bool {
        digest_matches(self.bootstrap_token_digest.as_ref(), presented)
    }

    pub fn trigger_enabled(&self) -> bool {
        self.trigger_secret_digest.is_some()
    }

    pub fn trigger_secret_matches(&self, presented: &str) -> bool {
        digest_matches(self.trigger_secret_digest.as_ref(), presented)
    }

    pub fn action_code_settings(&self) -> Option<ActionCodeSettings> {
        self.verification_continue_url
            .as_ref()
            .map(|url| ActionCodeSettings {
                url: url.to_string(),
                handle_code_in_app: None,
            })
    }
}

fn digest_of(secret: Option<&str>) -> Option<[u8; 32]> {
    secret.filter(|secret| !secret.is_empty()).map(sha256)
}

// Compares digests so the comparison time does not depend on where the
// presented value first differs.
fn digest_matches(expected: Option<&[u8; 32]>, presented: &str) -> bool {
    match expected {
        Some(expected) => {
            let actual = sha256(presented);
            expected
                .iter()
                .zip(actual.iter())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
        }
        None => false,
    }
}

fn sha256(value: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(value.as_bytes()));
    out
}
