//! Post endpoints: public reading plus owner-scoped CRUD.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::AppState;
use crate::api::models::pagination::{PAGE_SIZE, PageMeta, PageQuery, PaginatedResponse};
use crate::api::models::posts::{
    PostCreateRequest, PostResponse, PostUpdateRequest, PostWithOwnerResponse,
};
use crate::auth::current_user::CurrentUser;
use crate::db::errors::DbError;
use crate::db::handlers::{Posts, Repository};
use crate::db::models::posts::{PostCreateDBRequest, PostUpdateDBRequest};
use crate::db::handlers::posts::PostFilter;
use crate::errors::{Error, Result};
use crate::types::{PostId, abbrev_uuid};

/// Published posts, newest first, five per page.
#[utoipa::path(
    get,
    path = "/api/posts",
    params(PageQuery),
    responses(
        (status = 200, description = "A page of published posts", body = PaginatedResponse<PostWithOwnerResponse>),
    ),
    tag = "posts"
)]
#[instrument(skip(state))]
pub async fn list_public(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<PostWithOwnerResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut posts = Posts::new(&mut conn);

    let data = posts
        .list_approved_with_owner(PAGE_SIZE, query.offset())
        .await?
        .into_iter()
        .map(PostWithOwnerResponse::from)
        .collect();
    let total = posts
        .count(&PostFilter {
            approved: Some(true),
            ..Default::default()
        })
        .await?;

    Ok(Json(PaginatedResponse {
        data,
        meta: PageMeta::new(total, query.page()),
    }))
}

/// A single published post. Pending or rejected posts are indistinguishable
/// from missing ones.
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "The post", body = PostWithOwnerResponse),
        (status = 404, description = "No published post with this id"),
    ),
    tag = "posts"
)]
#[instrument(skip(state), fields(post_id = %abbrev_uuid(&id)))]
pub async fn get_public(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
) -> Result<Json<PostWithOwnerResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let post = Posts::new(&mut conn)
        .get_approved_with_owner(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "post".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(PostWithOwnerResponse::from(post)))
}

/// Create a post. It stays hidden from the public until approved.
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = PostCreateRequest,
    responses(
        (status = 201, description = "Post created, awaiting moderation", body = PostResponse),
        (status = 400, description = "Missing title or description"),
        (status = 401, description = "Not logged in"),
    ),
    tag = "posts"
)]
#[instrument(skip(state, user, request), fields(user_id = %abbrev_uuid(&user.0.id)))]
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<PostCreateRequest>,
) -> Result<impl IntoResponse> {
    if request.title.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Title is required".to_string(),
        });
    }
    if request.description.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Description is required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let post = Posts::new(&mut conn)
        .create(&PostCreateDBRequest {
            title: request.title,
            description: request.description,
            image: request.image,
            user_id: user.0.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// All of the caller's own posts, whatever their moderation state.
#[utoipa::path(
    get,
    path = "/api/my-posts",
    responses(
        (status = 200, description = "The caller's posts, newest first", body = Vec<PostResponse>),
        (status = 401, description = "Not logged in"),
    ),
    tag = "posts"
)]
#[instrument(skip(state, user), fields(user_id = %abbrev_uuid(&user.0.id)))]
pub async fn list_mine(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<PostResponse>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let posts = Posts::new(&mut conn)
        .list(&PostFilter {
            owner: Some(user.0.id),
            ..Default::default()
        })
        .await?
        .into_iter()
        .map(PostResponse::from)
        .collect();

    // An author with nothing published yet still gets a 200 and an
    // empty list, not an error.
    Ok(Json(posts))
}

/// Edit one of the caller's posts. Fields left out of the body keep their
/// values, and approval state is untouched.
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post id")),
    request_body = PostUpdateRequest,
    responses(
        (status = 200, description = "Updated post", body = PostResponse),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Post belongs to someone else"),
        (status = 404, description = "No such post"),
    ),
    tag = "posts"
)]
#[instrument(skip(state, user, request), fields(post_id = %abbrev_uuid(&id), user_id = %abbrev_uuid(&user.0.id)))]
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<PostId>,
    Json(request): Json<PostUpdateRequest>,
) -> Result<Json<PostResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut posts = Posts::new(&mut conn);

    let existing = posts.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "post".to_string(),
        id: id.to_string(),
    })?;
    if existing.user_id != user.0.id {
        return Err(Error::Forbidden {
            message: "You can only edit your own posts".to_string(),
        });
    }

    let updated = posts
        .update(
            id,
            &PostUpdateDBRequest {
                title: request.title,
                description: request.description,
                image: request.image,
            },
        )
        .await?;

    Ok(Json(PostResponse::from(updated)))
}

/// Delete one of the caller's posts, along with its comments.
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Post belongs to someone else"),
        (status = 404, description = "No such post"),
    ),
    tag = "posts"
)]
#[instrument(skip(state, user), fields(post_id = %abbrev_uuid(&id), user_id = %abbrev_uuid(&user.0.id)))]
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<PostId>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut posts = Posts::new(&mut conn);

    let existing = posts.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "post".to_string(),
        id: id.to_string(),
    })?;
    if existing.user_id != user.0.id {
        return Err(Error::Forbidden {
            message: "You can only delete your own posts".to_string(),
        });
    }

    posts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
