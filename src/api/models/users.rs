//! API types for users, authentication and profiles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::users::UserDBResponse;
use crate::types::UserId;

/// Account role. Stored in Postgres as the `user_role` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A user as returned to its owner or to admins. The password hash never
/// leaves the database layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
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

impl From<UserDBResponse> for UserResponse {
    fn from(user: UserDBResponse) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            bio: user.bio,
            location: user.location,
            website: user.website,
            picture_url: user.picture_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The subset of a profile shown to anyone, including anonymous visitors.
/// Contact details (email, phone) stay private.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicProfileResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserDBResponse> for PublicProfileResponse {
    fn from(user: UserDBResponse) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            location: user.location,
            website: user.website,
            picture_url: user.picture_url,
            created_at: user.created_at,
        }
    }
}

/// Typed patch for the caller's own profile. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub picture_url: Option<String>,
}

/// Admin request to change a user's role. The role arrives as a string
/// and is validated by hand so an unknown value is a 400, not a
/// deserialization rejection.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RoleUpdateRequest {
    pub role: String,
}
