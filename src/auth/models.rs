use serde::{Deserialize, Serialize};

/// An account as returned by the Identity Toolkit API.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    pub local_id: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub display_name: Option<String>,
    pub disabled: bool,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

/// Where the user lands after following an email action link.
#[derive(Debug, Clone, Default)]
pub struct ActionCodeSettings {
    pub url: String,
    pub handle_code_in_app: Option<bool>,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmailLinkRequest {
    pub request_type: String,
    pub email: String,
    pub return_oob_link: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continue_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_handle_code_in_app: Option<bool>,
}

impl EmailLinkRequest {
    pub fn verify_email(email: &str, settings: Option<ActionCodeSettings>) -> Self {
        let (continue_url, can_handle_code_in_app) = match settings {
            Some(s) => (Some(s.url), s.handle_code_in_app),
            None => (None, None),
        };
        Self {
            request_type: "VERIFY_EMAIL".to_string(),
            email: email.to_string(),
            return_oob_link: true,
            continue_url,
            can_handle_code_in_app,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailLinkResponse {
    pub email: Option<String>,
    pub oob_link: String,
}
