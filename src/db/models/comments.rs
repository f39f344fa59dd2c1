//! Database layer types for comments.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{CommentId, PostId, UserId};

#[derive(Debug, Clone)]
pub struct CommentCreateDBRequest {
    pub content: String,
    pub user_id: UserId,
    pub post_id: PostId,
}

#[derive(Debug, Clone, Default)]
pub struct CommentUpdateDBRequest {
    pub content: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentDBResponse {
    pub id: CommentId,
    pub content: String,
    pub user_id: UserId,
    pub post_id: PostId,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment row joined with its owner's public profile fields and, for
/// moderation views, the title of the post it belongs to.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithContextDBResponse {
    pub id: CommentId,
    pub content: String,
    pub user_id: UserId,
    pub post_id: PostId,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
    pub owner_picture_url: Option<String>,
    pub post_title: String,
}
