//! API types for comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::posts::PostOwner;
use crate::db::models::comments::{CommentDBResponse, CommentWithContextDBResponse};
use crate::types::{CommentId, PostId, UserId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CommentCreateRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CommentId,
    pub content: String,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub post_id: PostId,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CommentDBResponse> for CommentResponse {
    fn from(comment: CommentDBResponse) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            user_id: comment.user_id,
            post_id: comment.post_id,
            is_approved: comment.is_approved,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

/// A comment with its author and the title of the post it was left on.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentWithContextResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CommentId,
    pub content: String,
    #[schema(value_type = String, format = "uuid")]
    pub post_id: PostId,
    pub post_title: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: PostOwner,
}

impl From<CommentWithContextDBResponse> for CommentWithContextResponse {
    fn from(comment: CommentWithContextDBResponse) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            post_title: comment.post_title,
            is_approved: comment.is_approved,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            owner: PostOwner {
                id: comment.user_id,
                first_name: comment.owner_first_name,
                last_name: comment.owner_last_name,
                picture_url: comment.owner_picture_url,
            },
        }
    }
}
