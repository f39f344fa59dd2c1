//! Database layer types for posts.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{PostId, UserId};

#[derive(Debug, Clone)]
pub struct PostCreateDBRequest {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub user_id: UserId,
}

/// Partial update for a post row. Approval state is deliberately absent;
/// editing a post never changes whether it is published.
#[derive(Debug, Clone, Default)]
pub struct PostUpdateDBRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PostDBResponse {
    pub id: PostId,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub user_id: UserId,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post row joined with its owner's public profile fields.
#[derive(Debug, Clone, FromRow)]
pub struct PostWithOwnerDBResponse {
    pub id: PostId,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub user_id: UserId,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
    pub owner_picture_url: Option<String>,
}
