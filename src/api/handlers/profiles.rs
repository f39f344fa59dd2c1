//! Profile endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::AppState;
use crate::api::models::users::{ProfileUpdateRequest, PublicProfileResponse, UserResponse};
use crate::auth::current_user::CurrentUser;
use crate::db::errors::DbError;
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::UserUpdateDBRequest;
use crate::errors::{Error, Result};
use crate::types::{UserId, abbrev_uuid};

/// A user's public profile. Visible to anyone; email and phone are not
/// part of it.
#[utoipa::path(
    get,
    path = "/api/users/{id}/profile",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfileResponse),
        (status = 404, description = "No such user"),
    ),
    tag = "profiles"
)]
#[instrument(skip(state), fields(user_id = %abbrev_uuid(&id)))]
pub async fn get_public(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<PublicProfileResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user = Users::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "user".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(PublicProfileResponse::from(user)))
}

/// The caller's own profile, contact details included.
#[utoipa::path(
    get,
    path = "/api/my-profile",
    responses(
        (status = 200, description = "Own profile", body = UserResponse),
        (status = 401, description = "Not logged in"),
    ),
    tag = "profiles"
)]
#[instrument(skip(user))]
pub async fn get_mine(CurrentUser(user): CurrentUser) -> Result<Json<UserResponse>> {
    Ok(Json(UserResponse::from(user)))
}

/// Update the caller's profile. Absent fields keep their values.
#[utoipa::path(
    put,
    path = "/api/my-profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 401, description = "Not logged in"),
    ),
    tag = "profiles"
)]
#[instrument(skip(state, user, request), fields(user_id = %abbrev_uuid(&user.0.id)))]
pub async fn update_mine(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ProfileUpdateRequest>,
) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = Users::new(&mut conn)
        .update(
            user.0.id,
            &UserUpdateDBRequest {
                first_name: request.first_name,
                last_name: request.last_name,
                phone: request.phone,
                bio: request.bio,
                location: request.location,
                website: request.website,
                picture_url: request.picture_url,
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(UserResponse::from(updated)))
}
