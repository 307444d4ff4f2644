use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{PublicProfile, UserSummary};

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: PublicProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserSummary,
}

/// Absent or blank fields leave the stored value unchanged.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateUserResponse {
    pub user: UserSummary,
    pub token: String,
}

/// Re-authentication for destructive operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: usize,
}
