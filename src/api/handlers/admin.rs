//! Admin endpoints: moderation queues and user management.
//!
//! Everything here takes an [`AdminUser`], so a valid session with the
//! wrong role is a 403 before any handler body runs. Admin listings
//! bypass the approval filters entirely.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::AppState;
use crate::api::models::comments::{CommentResponse, CommentWithContextResponse};
use crate::api::models::posts::{PostResponse, PostWithOwnerResponse};
use crate::api::models::users::{Role, RoleUpdateRequest, UserResponse};
use crate::auth::current_user::AdminUser;
use crate::db::errors::DbError;
use crate::db::handlers::comments::CommentFilter;
use crate::db::handlers::posts::PostFilter;
use crate::db::handlers::users::UserFilter;
use crate::db::handlers::{Comments, Posts, Repository, Users};
use crate::db::models::users::UserUpdateDBRequest;
use crate::errors::{Error, Result};
use crate::types::{CommentId, PostId, UserId, abbrev_uuid};

fn post_not_found(id: PostId) -> Error {
    Error::NotFound {
        resource: "post".to_string(),
        id: id.to_string(),
    }
}

fn comment_not_found(id: CommentId) -> Error {
    Error::NotFound {
        resource: "comment".to_string(),
        id: id.to_string(),
    }
}

// Posts

/// Every post regardless of moderation state, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/posts",
    responses(
        (status = 200, description = "All posts", body = Vec<PostResponse>),
        (status = 403, description = "Not an admin"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, _admin))]
pub async fn list_all_posts(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<PostResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let posts = Posts::new(&mut conn)
        .list(&PostFilter::default())
        .await?
        .into_iter()
        .map(PostResponse::from)
        .collect();

    Ok(Json(posts))
}

/// The post moderation queue, newest submissions first.
#[utoipa::path(
    get,
    path = "/api/admin/posts/pending",
    responses(
        (status = 200, description = "Posts awaiting review", body = Vec<PostWithOwnerResponse>),
        (status = 403, description = "Not an admin"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, _admin))]
pub async fn list_pending_posts(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<PostWithOwnerResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let posts = Posts::new(&mut conn)
        .list_pending_with_owner()
        .await?
        .into_iter()
        .map(PostWithOwnerResponse::from)
        .collect();

    Ok(Json(posts))
}

/// Publish a post. Approving an already-published post is a no-op.
#[utoipa::path(
    put,
    path = "/api/admin/posts/{id}/approve",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "The now-published post", body = PostResponse),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such post"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, _admin), fields(post_id = %abbrev_uuid(&id)))]
pub async fn approve_post(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<PostId>,
) -> Result<Json<PostResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let post = Posts::new(&mut conn).approve(id).await.map_err(|e| match e {
        DbError::NotFound => post_not_found(id),
        other => other.into(),
    })?;

    Ok(Json(PostResponse::from(post)))
}

/// Reject a submission. Rejection is permanent: the post is deleted
/// rather than parked in a rejected state.
#[utoipa::path(
    delete,
    path = "/api/admin/posts/{id}/reject",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post rejected and removed"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such post"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, _admin), fields(post_id = %abbrev_uuid(&id)))]
pub async fn reject_post(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<PostId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    if !Posts::new(&mut conn).delete(id).await? {
        return Err(post_not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Remove any post, published or not, regardless of owner.
#[utoipa::path(
    delete,
    path = "/api/admin/posts/{id}",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such post"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, _admin), fields(post_id = %abbrev_uuid(&id)))]
pub async fn delete_post(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<PostId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    if !Posts::new(&mut conn).delete(id).await? {
        return Err(post_not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}

// Comments

/// Every comment regardless of moderation state, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/comments",
    responses(
        (status = 200, description = "All comments", body = Vec<CommentResponse>),
        (status = 403, description = "Not an admin"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, _admin))]
pub async fn list_all_comments(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<CommentResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let comments = Comments::new(&mut conn)
        .list(&CommentFilter::default())
        .await?
        .into_iter()
        .map(CommentResponse::from)
        .collect();

    Ok(Json(comments))
}

/// The comment moderation queue, newest first, each with its author and
/// the post it was left on.
#[utoipa::path(
    get,
    path = "/api/admin/comments/pending",
    responses(
        (status = 200, description = "Comments awaiting review", body = Vec<CommentWithContextResponse>),
        (status = 403, description = "Not an admin"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, _admin))]
pub async fn list_pending_comments(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<CommentWithContextResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let comments = Comments::new(&mut conn)
        .list_pending_with_context()
        .await?
        .into_iter()
        .map(CommentWithContextResponse::from)
        .collect();

    Ok(Json(comments))
}

/// Publish a comment. Approving an already-published comment is a no-op.
#[utoipa::path(
    put,
    path = "/api/admin/comments/{id}/approve",
    params(("id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 200, description = "The now-published comment", body = CommentResponse),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such comment"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, _admin), fields(comment_id = %abbrev_uuid(&id)))]
pub async fn approve_comment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<CommentId>,
) -> Result<Json<CommentResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let comment = Comments::new(&mut conn)
        .approve(id)
        .await
        .map_err(|e| match e {
            DbError::NotFound => comment_not_found(id),
            other => other.into(),
        })?;

    Ok(Json(CommentResponse::from(comment)))
}

/// Reject a comment, deleting it outright.
#[utoipa::path(
    delete,
    path = "/api/admin/comments/{id}/reject",
    params(("id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Comment rejected and removed"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such comment"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, _admin), fields(comment_id = %abbrev_uuid(&id)))]
pub async fn reject_comment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<CommentId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    if !Comments::new(&mut conn).delete(id).await? {
        return Err(comment_not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Remove any comment, regardless of owner or state.
#[utoipa::path(
    delete,
    path = "/api/admin/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such comment"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, _admin), fields(comment_id = %abbrev_uuid(&id)))]
pub async fn delete_comment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<CommentId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    if !Comments::new(&mut conn).delete(id).await? {
        return Err(comment_not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}

// Users

/// Every registered account. Password hashes never appear in the output.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 403, description = "Not an admin"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let users = Users::new(&mut conn)
        .list(&UserFilter::default())
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

/// Promote or demote an account. The role arrives as a string and is
/// checked against the known set, so a typo is a 400.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = RoleUpdateRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such user"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, _admin, request), fields(user_id = %abbrev_uuid(&id)))]
pub async fn update_user_role(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<UserId>,
    Json(request): Json<RoleUpdateRequest>,
) -> Result<Json<UserResponse>> {
    let role: Role = request.role.parse().map_err(|_| Error::BadRequest {
        message: format!("Invalid role {:?}, expected \"user\" or \"admin\"", request.role),
    })?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user = Users::new(&mut conn)
        .update(
            id,
            &UserUpdateDBRequest {
                role: Some(role),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| match e {
            DbError::NotFound => Error::NotFound {
                resource: "user".to_string(),
                id: id.to_string(),
            },
            other => other.into(),
        })?;

    Ok(Json(UserResponse::from(user)))
}

/// Delete an account along with all its posts and comments. Admins
/// cannot delete themselves.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Attempted self-deletion"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "No such user"),
    ),
    tag = "admin"
)]
#[instrument(skip(state, admin), fields(user_id = %abbrev_uuid(&id)))]
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    if admin.0.id == id {
        return Err(Error::BadRequest {
            message: "You cannot delete your own account".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    if !Users::new(&mut conn).delete(id).await? {
        return Err(Error::NotFound {
            resource: "user".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
