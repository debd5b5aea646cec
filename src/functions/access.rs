use super::models::{profile_role, Role, USERS};
use super::{AuthContext, FunctionsError};
use crate::FirebaseApp;

/// Succeeds only when the caller's `users/{uid}` profile has role `super_admin`.
///
/// `context` prefixes the internal error reported if the profile read fails.
pub async fn require_super_admin(
    app: &FirebaseApp,
    auth: &AuthContext,
    context: &str,
) -> Result<(), FunctionsError> {
    let profile: Option<serde_json::Value> = app
        .firestore()
        .collection(USERS)
        .doc(&auth.uid)
        .get()
        .await
        .map_err(|e| {
            tracing::error!(uid = %auth.uid, error = %e, "failed to read caller profile");
            FunctionsError::upstream(context, &e)
        })?;

    match profile.as_ref().and_then(profile_role) {
        Some(Role::SuperAdmin) => Ok(()),
        role => {
            tracing::warn!(uid = %auth.uid, ?role, "caller is not a super admin");
            Err(FunctionsError::permission_denied(
                "Only super admins can perform this action",
            ))
        }
    }
}
