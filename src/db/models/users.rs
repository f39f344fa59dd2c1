//! Database layer types for users.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::api::models::users::Role;
use crate::types::UserId;

/// Payload for inserting a new user row. The password has already been
/// hashed by the API layer.
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Partial update for a user row. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub picture_url: Option<String>,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
}

/// A full user row, including the password hash. Never serialized to
/// clients directly; convert to an API response type first.
#[derive(Debug, Clone, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
