use crate::utils::serde_helpers::record_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Full `user` row. The id is assigned by the identity provider; the password
/// column holds an argon2 hash and never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(with = "record_id")]
    pub id: String,
    pub username: String,
    pub name: String,
    pub password: String,
    pub role: String,
    pub profile_pic: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The projection of a user that is safe to put on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfile {
    #[serde(with = "record_id")]
    pub id: String,
    pub name: String,
    pub username: String,
    pub role: String,
    pub profile_pic: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 50))]
    pub username: String,

    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "Name cannot be empty or exceed 100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 50, message = "Username cannot be empty or exceed 50 characters"))]
    pub username: Option<String>,

    #[validate(length(max = 500, message = "Bio cannot exceed 500 characters"))]
    pub bio: Option<String>,

    #[validate(url)]
    pub profile_pic: Option<String>,
}
