//! Comment endpoints: public reading under a post, plus creation.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::AppState;
use crate::api::models::comments::{
    CommentCreateRequest, CommentResponse, CommentWithContextResponse,
};
use crate::api::models::pagination::{PAGE_SIZE, PageMeta, PageQuery, PaginatedResponse};
use crate::auth::current_user::CurrentUser;
use crate::db::errors::DbError;
use crate::db::handlers::comments::CommentFilter;
use crate::db::handlers::{Comments, Repository};
use crate::db::models::comments::CommentCreateDBRequest;
use crate::errors::{Error, Result};
use crate::types::{PostId, abbrev_uuid};

/// Approved comments under a post, oldest first, five per page.
#[utoipa::path(
    get,
    path = "/api/posts/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "Post id"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "A page of comments", body = PaginatedResponse<CommentWithContextResponse>),
    ),
    tag = "comments"
)]
#[instrument(skip(state), fields(post_id = %abbrev_uuid(&post_id)))]
pub async fn list_for_post(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<CommentWithContextResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut comments = Comments::new(&mut conn);

    let data = comments
        .list_approved_for_post(post_id, PAGE_SIZE, query.offset())
        .await?
        .into_iter()
        .map(CommentWithContextResponse::from)
        .collect();
    let total = comments
        .count(&CommentFilter {
            post: Some(post_id),
            approved: Some(true),
            ..Default::default()
        })
        .await?;

    Ok(Json(PaginatedResponse {
        data,
        meta: PageMeta::new(total, query.page()),
    }))
}

/// Leave a comment on a post. It stays hidden until approved.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    params(("id" = Uuid, Path, description = "Post id")),
    request_body = CommentCreateRequest,
    responses(
        (status = 201, description = "Comment created, awaiting moderation", body = CommentResponse),
        (status = 400, description = "Empty content, or the post does not exist"),
        (status = 401, description = "Not logged in"),
    ),
    tag = "comments"
)]
#[instrument(skip(state, user, request), fields(post_id = %abbrev_uuid(&post_id), user_id = %abbrev_uuid(&user.0.id)))]
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<PostId>,
    Json(request): Json<CommentCreateRequest>,
) -> Result<impl IntoResponse> {
    if request.content.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Content is required".to_string(),
        });
    }

    // No pre-flight post lookup; commenting on a missing post trips the
    // foreign key and comes back as a 400.
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let comment = Comments::new(&mut conn)
        .create(&CommentCreateDBRequest {
            content: request.content,
            user_id: user.0.id,
            post_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{
        auth_cookie, create_test_app, create_test_comment, create_test_post, create_test_user,
    };
    use axum::http::header::COOKIE;
    use serde_json::json;
    use sqlx::PgPool;
    use uuid::Uuid;

    #[sqlx::test]
    #[test_log::test]
    async fn commenting_requires_session(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let (user, _) = create_test_user(&pool, Role::User).await;
        let post = create_test_post(&pool, user.id, "Post", true).await;

        let response = server
            .post(&format!("/api/posts/{}/comments", post.id))
            .json(&json!({"content": "hi"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn new_comments_await_moderation(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let (user, _) = create_test_user(&pool, Role::User).await;
        let post = create_test_post(&pool, user.id, "Post", true).await;

        let response = server
            .post(&format!("/api/posts/{}/comments", post.id))
            .add_header(COOKIE, auth_cookie(user.id))
            .json(&json!({"content": "nice post"}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["is_approved"], false);

        // Unapproved comments do not show up publicly.
        let listing = server
            .get(&format!("/api/posts/{}/comments", post.id))
            .await;
        let body: serde_json::Value = listing.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 0);
        assert_eq!(body["meta"]["total"], 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn empty_content_is_400(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let (user, _) = create_test_user(&pool, Role::User).await;
        let post = create_test_post(&pool, user.id, "Post", true).await;

        let response = server
            .post(&format!("/api/posts/{}/comments", post.id))
            .add_header(COOKIE, auth_cookie(user.id))
            .json(&json!({"content": "   "}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn commenting_on_missing_post_is_400(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let (user, _) = create_test_user(&pool, Role::User).await;

        let response = server
            .post(&format!("/api/posts/{}/comments", Uuid::new_v4()))
            .add_header(COOKIE, auth_cookie(user.id))
            .json(&json!({"content": "into the void"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Referenced post does not exist");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn public_listing_reads_oldest_first_with_authors(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let (author, _) = create_test_user(&pool, Role::User).await;
        let post = create_test_post(&pool, author.id, "Post", true).await;

        let first = create_test_comment(&pool, author.id, post.id, "first", true).await;
        let second = create_test_comment(&pool, author.id, post.id, "second", true).await;
        create_test_comment(&pool, author.id, post.id, "pending", false).await;

        let response = server
            .get(&format!("/api/posts/{}/comments", post.id))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["id"], first.id.to_string());
        assert_eq!(data[1]["id"], second.id.to_string());
        assert_eq!(data[0]["owner"]["id"], author.id.to_string());
        assert_eq!(body["meta"]["total"], 2);
    }
}
