use super::models::{profile_role, USERS};
use super::{FunctionsError, FunctionsErrorCode, FunctionsSettings};
use crate::FirebaseApp;
use serde::{Deserialize, Serialize};

const CONTEXT: &str = "Failed to send welcome email";

/// The account delivered by the account-creation trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUserEvent {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

/// Runs once per newly created account: looks up its profile and requests an
/// email verification link for its address.
///
/// The profile only feeds the log, so its shape never blocks the link. An
/// account without an email address fails as internal, as the provider would
/// reject the request.
pub async fn send_welcome_email(
    app: &FirebaseApp,
    settings: &FunctionsSettings,
    user: &AuthUserEvent,
) -> Result<(), FunctionsError> {
    let profile: Option<serde_json::Value> = app
        .firestore()
        .collection(USERS)
        .doc(&user.uid)
        .get()
        .await
        .map_err(|e| {
            tracing::error!(uid = %user.uid, error = %e, "failed to read new user's profile");
            FunctionsError::upstream(CONTEXT, &e)
        })?;

    let Some(email) = user.email.as_deref().filter(|email| !email.is_empty()) else {
        tracing::error!(uid = %user.uid, "new account has no email; no verification link sent");
        return Err(FunctionsError::new(
            FunctionsErrorCode::Internal,
            format!("{}: account has no email address", CONTEXT),
        ));
    };

    app.auth()
        .generate_email_verification_link(email, settings.action_code_settings())
        .await
        .map_err(|e| {
            tracing::error!(uid = %user.uid, email, error = %e, "failed to send welcome email");
            FunctionsError::upstream(CONTEXT, &e)
        })?;

    tracing::info!(
        uid = %user.uid,
        email,
        has_profile = profile.is_some(),
        role = ?profile.as_ref().and_then(profile_role),
        "welcome email sent"
    );

    Ok(())
}
