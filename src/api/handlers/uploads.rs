//! Image upload endpoint.

use axum::{Json, extract::Multipart, extract::State};
use tracing::instrument;
use uuid::Uuid;

use crate::AppState;
use crate::auth::current_user::CurrentUser;
use crate::errors::{Error, Result};

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

fn extension_of(filename: &str) -> Option<String> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Upload an image. The file is stored under a server-generated name and
/// the response carries the path it will be served from.
#[utoipa::path(
    post,
    path = "/api/upload",
    responses(
        (status = 201, description = "File stored, response carries its URL"),
        (status = 400, description = "No file part, or not an allowed image type"),
        (status = 401, description = "Not logged in"),
    ),
    tag = "uploads"
)]
#[instrument(skip(state, _user, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    _user: CurrentUser,
    mut multipart: Multipart,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Malformed multipart body: {e}"),
    })? {
        let Some(filename) = field.file_name().map(String::from) else {
            continue;
        };

        let ext = extension_of(&filename).ok_or_else(|| Error::BadRequest {
            message: format!(
                "Unsupported file type, expected one of: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ),
        })?;

        let data = field.bytes().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read upload: {e}"),
        })?;
        if data.is_empty() {
            return Err(Error::BadRequest {
                message: "Uploaded file is empty".to_string(),
            });
        }

        let stored_name = format!("{}.{ext}", Uuid::new_v4().simple());
        state.store.put(&stored_name, data).await?;

        return Ok((
            axum::http::StatusCode::CREATED,
            Json(serde_json::json!({ "url": format!("/uploads/{stored_name}") })),
        ));
    }

    Err(Error::BadRequest {
        message: "No file in upload".to_string(),
    })
}
