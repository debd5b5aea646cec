use super::access::require_super_admin;
use super::models::{
    Role, UserProfile, BOOTSTRAP_CLAIM, CLAIMED_AT, CREATED_AT, SYSTEM, USERS,
};
use super::{CallableContext, FunctionsError, FunctionsSettings};
use crate::auth::models::CreateUserRequest;
use crate::firestore::models::FieldTransform;
use crate::firestore::FirestoreError;
use crate::FirebaseApp;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

const CONTEXT: &str = "Failed to create super admin";

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateSuperAdminRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for CreateSuperAdminRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateSuperAdminRequest")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CreateSuperAdminRequest {
    /// Rejects a request without a non-empty email and password.
    pub fn validate(&self) -> Result<(), FunctionsError> {
        self.credentials().map(|_| ())
    }

    fn credentials(&self) -> Result<(&str, &str), FunctionsError> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(FunctionsError::invalid_argument(
                "Email and password are required",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSuperAdminResponse {
    pub success: bool,
    pub message: String,
    pub uid: String,
}

/// Creates a pre-verified account and its `super_admin` profile.
///
/// Callers must either be signed in as a super admin, or present the
/// configured bootstrap token while no super admin exists yet. A bootstrap
/// token is spent by the first call that gets past that check. If the profile
/// write fails after the account was created, the account is left in place.
pub async fn create_super_admin(
    app: &FirebaseApp,
    settings: &FunctionsSettings,
    ctx: &CallableContext,
    request: CreateSuperAdminRequest,
) -> Result<CreateSuperAdminResponse, FunctionsError> {
    let (email, password) = request.credentials()?;

    authorize(app, settings, ctx, email).await?;

    let user = app
        .auth()
        .create_user(CreateUserRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            email_verified: Some(true),
            ..Default::default()
        })
        .await
        .map_err(|e| {
            tracing::error!(email = %email, error = %e, "failed to create super admin account");
            FunctionsError::upstream(CONTEXT, &e)
        })?;

    let uid = user.local_id;

    app.firestore()
        .collection(USERS)
        .doc(&uid)
        .set_with_transforms(
            &UserProfile::super_admin(&uid, email),
            &[FieldTransform::server_timestamp(CREATED_AT)],
        )
        .await
        .map_err(|e| {
            tracing::error!(
                uid = %uid,
                email = %email,
                error = %e,
                "account created but profile write failed; account has no profile"
            );
            FunctionsError::upstream(CONTEXT, &e)
        })?;

    tracing::info!(uid = %uid, email = %email, "super admin created");

    Ok(CreateSuperAdminResponse {
        success: true,
        message: "Super admin created successfully".to_string(),
        uid,
    })
}

async fn authorize(
    app: &FirebaseApp,
    settings: &FunctionsSettings,
    ctx: &CallableContext,
    email: &str,
) -> Result<(), FunctionsError> {
    if let Some(auth) = &ctx.auth {
        return require_super_admin(app, auth, CONTEXT).await;
    }

    let Some(token) = ctx.bootstrap_token.as_deref() else {
        tracing::warn!("createSuperAdmin called without authentication or bootstrap token");
        return Err(FunctionsError::unauthenticated(
            "The function must be called while authenticated",
        ));
    };

    if !settings.bootstrap_token_matches(token) {
        tracing::warn!(
            bootstrap_enabled = settings.bootstrap_enabled(),
            "rejected bootstrap token"
        );
        return Err(FunctionsError::permission_denied("Invalid bootstrap token"));
    }

    let existing = app
        .firestore()
        .collection(USERS)
        .where_equal("role", Role::SuperAdmin)
        .map_err(|e| FunctionsError::upstream(CONTEXT, &e))?
        .limit(1)
        .get()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to look up existing super admins");
            FunctionsError::upstream(CONTEXT, &e)
        })?;

    if let Some(first) = existing.documents().first() {
        tracing::warn!(
            existing_uid = first.id(),
            "bootstrap token presented after a super admin already exists"
        );
        return Err(FunctionsError::permission_denied(
            "A super admin already exists; sign in as a super admin to create another",
        ));
    }

    claim_bootstrap(app, email).await
}

// Two bootstrap calls can both see no super admin; only the one whose create
// of `system/bootstrap` succeeds may go on.
async fn claim_bootstrap(app: &FirebaseApp, email: &str) -> Result<(), FunctionsError> {
    let claim = json!({ "email": email });
    match app
        .firestore()
        .collection(SYSTEM)
        .doc(BOOTSTRAP_CLAIM)
        .create_with_transforms(&claim, &[FieldTransform::server_timestamp(CLAIMED_AT)])
        .await
    {
        Ok(_) => Ok(()),
        Err(FirestoreError::AlreadyExists(_)) => {
            tracing::warn!(email = %email, "bootstrap token already spent");
            Err(FunctionsError::permission_denied(
                "The bootstrap token has already been used",
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to claim bootstrap");
            Err(FunctionsError::upstream(CONTEXT, &e))
        }
    }
}
