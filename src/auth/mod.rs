//! Firebase Authentication module.
//!
//! Covers the slice of the Identity Toolkit API the functions need: account
//! creation, email verification links, and ID token verification for callers.

pub mod keys;
pub mod models;
pub mod verifier;


use crate::auth::models::{
    ActionCodeSettings, CreateUserRequest, EmailLinkRequest, EmailLinkResponse, UserRecord,
};
use crate::core::parse_error_response;
use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;

const IDENTITY_TOOLKIT_V1_API: &str = "https://identitytoolkit.googleapis.com/v1/projects";

/// Errors that can occur during Identity Toolkit calls.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AuthError {
    /// The message reported by the API itself, if the failure got that far.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            AuthError::ApiError(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Client for the Identity Toolkit (Firebase Auth) REST API.
#[derive(Clone)]
pub struct FirebaseAuth {
    client: ClientWithMiddleware,
    base_url: String,
}

impl FirebaseAuth {
    /// Creates a client for the given project.
    ///
    /// `client` is expected to carry the service-account `AuthMiddleware`.
    pub fn new(client: ClientWithMiddleware, project_id: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/{}", IDENTITY_TOOLKIT_V1_API, project_id),
        }
    }

    /// Creates a client against a custom base URL such as the Auth emulator.
    ///
    /// `base_url` must already include the `/projects/{project_id}` suffix.
    pub fn new_with_client(client: ClientWithMiddleware, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Creates a new account.
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<UserRecord, AuthError> {
        let url = format!("{}/accounts", self.base_url);

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(AuthError::ApiError(
                parse_error_response(response, "Create user failed").await,
            ));
        }

        let user: UserRecord = response.json().await?;
        Ok(user)
    }

    /// Generates an out-of-band email verification link for `email`.
    pub async fn generate_email_verification_link(
        &self,
        email: &str,
        settings: Option<ActionCodeSettings>,
    ) -> Result<String, AuthError> {
        let url = format!("{}/accounts:sendOobCode", self.base_url);

        let request = EmailLinkRequest::verify_email(email, settings);

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(AuthError::ApiError(
                parse_error_response(response, "Generate email verification link failed").await,
            ));
        }

        let result: EmailLinkResponse = response.json().await?;
        Ok(result.oob_link)
    }
}
