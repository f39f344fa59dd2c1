//! API types for posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::posts::{PostDBResponse, PostWithOwnerDBResponse};
use crate::types::{PostId, UserId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PostCreateRequest {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

/// Typed patch for a post. Absent fields are unchanged, and approval
/// state cannot be expressed here at all.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PostUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PostId,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostDBResponse> for PostResponse {
    fn from(post: PostDBResponse) -> Self {
        Self {
            id: post.id,
            title: post.title,
            description: post.description,
            image: post.image,
            user_id: post.user_id,
            is_approved: post.is_approved,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// The post author, as shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostOwner {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture_url: Option<String>,
}

/// A post with its author attached, for the public and moderation views.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostWithOwnerResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PostId,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: PostOwner,
}

impl From<PostWithOwnerDBResponse> for PostWithOwnerResponse {
    fn from(post: PostWithOwnerDBResponse) -> Self {
        Self {
            id: post.id,
            title: post.title,
            description: post.description,
            image: post.image,
            is_approved: post.is_approved,
            created_at: post.created_at,
            updated_at: post.updated_at,
            owner: PostOwner {
                id: post.user_id,
                first_name: post.owner_first_name,
                last_name: post.owner_last_name,
                picture_url: post.owner_picture_url,
            },
        }
    }
}
