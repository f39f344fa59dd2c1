//! Registration, login, logout and the current-user endpoint.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::instrument;

use crate::AppState;
use crate::api::models::users::{LoginRequest, RegisterRequest, Role, UserResponse};
use crate::auth::current_user::CurrentUser;
use crate::auth::password::{hash_string, verify_string};
use crate::auth::session::create_session_token;
use crate::auth::validation::{validate_email, validate_password};
use crate::config::Config;
use crate::db::errors::DbError;
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::UserCreateDBRequest;
use crate::errors::{Error, Result};

/// Build the session cookie string for a freshly issued token.
pub fn create_session_cookie(token: &str, config: &Config) -> String {
    let session = &config.auth.session;
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite={}; Max-Age={}",
        session.cookie_name,
        token,
        session.cookie_same_site,
        session.timeout.as_secs()
    );
    if session.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// A cookie that immediately expires the session in the browser.
fn clear_session_cookie(config: &Config) -> String {
    let session = &config.auth.session;
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite={}; Max-Age=0",
        session.cookie_name, session.cookie_same_site
    );
    if session.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid email, weak password or email already registered"),
    ),
    tag = "auth"
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    validate_email(&request.email)?;
    validate_password(&request.password, &state.config.auth.password)?;

    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_string(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("joining password hash task: {e}"),
        })??;

    let mut tx = state.db.begin().await.map_err(DbError::from)?;
    let mut users = Users::new(&mut tx);

    if users.get_user_by_email(&request.email).await?.is_some() {
        return Err(Error::Conflict {
            message: "Email address is already registered".to_string(),
        });
    }

    let user = users
        .create(&UserCreateDBRequest {
            email: request.email,
            password_hash,
            role: Role::User,
        })
        .await?;

    tx.commit().await.map_err(DbError::from)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Log in and receive a session cookie.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session created", body = UserResponse),
        (status = 401, description = "Unknown email or wrong password"),
    ),
    tag = "auth"
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    // One message for both failure modes, so login cannot be used to
    // probe which emails are registered.
    let invalid = || Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user = Users::new(&mut conn)
        .get_user_by_email(&request.email)
        .await?
        .ok_or_else(invalid)?;

    let password = request.password;
    let stored_hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_string(&password, &stored_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("joining password verify task: {e}"),
        })??;

    if !verified {
        return Err(invalid());
    }

    let token = create_session_token(
        user.id,
        &state.config.secret_key,
        state.config.auth.session.timeout,
    )?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(user)),
    ))
}

/// Clear the session cookie.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Session cleared"),
        (status = 401, description = "Not logged in"),
    ),
    tag = "auth"
)]
#[instrument(skip(state, _user))]
pub async fn logout(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<impl IntoResponse> {
    let cookie = clear_session_cookie(&state.config);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({ "message": "Logged out" })),
    ))
}

/// The account behind the current session.
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not logged in"),
    ),
    tag = "auth"
)]
#[instrument(skip(user))]
pub async fn current_user(CurrentUser(user): CurrentUser) -> Result<Json<UserResponse>> {
    Ok(Json(UserResponse::from(user)))
}
