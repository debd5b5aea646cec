//! Document shapes for the `users`, `departments`, `doctors` and `patients`
//! collections. `createdAt` is never part of these structs; it is written as
//! a server timestamp transform.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const USERS: &str = "users";
pub const DEPARTMENTS: &str = "departments";
pub const DOCTORS: &str = "doctors";
pub const PATIENTS: &str = "patients";

pub const CREATED_AT: &str = "createdAt";

/// `system/bootstrap` marks that the bootstrap token has been spent.
pub const SYSTEM: &str = "system";
pub const BOOTSTRAP_CLAIM: &str = "bootstrap";
pub const CLAIMED_AT: &str = "claimedAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Doctor,
    Patient,
    #[serde(other)]
    Unknown,
}

/// `users/{uid}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
}

impl UserProfile {
    pub fn super_admin(uid: &str, email: &str) -> Self {
        Self {
            uid: uid.to_string(),
            email: email.to_string(),
            role: Role::SuperAdmin,
            is_active: true,
        }
    }
}

/// Reads `role` from a stored profile. Anything other than a string naming a
/// known role, including a missing or non-string field, yields `None` or
/// `Role::Unknown`.
pub fn profile_role(profile: &Value) -> Option<Role> {
    profile
        .get("role")
        .and_then(|role| serde_json::from_value(role.clone()).ok())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

/// `department` holds a department name as free text, not a reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub specialization: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    pub gender: String,
    pub is_active: bool,
}
