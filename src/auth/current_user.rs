//! Request extractors for the authenticated user.
//!
//! [`CurrentUser`] implements the session gate: read the session cookie,
//! verify the token, then load the user it names from the database. Any
//! failure along that path (no cookie, bad token, user since deleted) is
//! a 401. [`AdminUser`] layers a role check on top and fails with 403,
//! so "who are you" and "are you allowed" stay distinct status codes.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppState;
use crate::api::models::users::Role;
use crate::auth::session::{SessionClaims, verify_session_token};
use crate::config::Config;
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::UserDBResponse;
use crate::errors::{Error, Result};

/// Try to authenticate a request from its session cookie.
///
/// Returns `Ok(None)` when no session cookie is present, `Err` when a
/// cookie is present but its token does not verify.
pub fn try_jwt_session_auth(parts: &Parts, config: &Config) -> Result<Option<SessionClaims>> {
    let Some(cookie_header) = parts
        .headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
    else {
        return Ok(None);
    };

    let cookie_name = config.auth.session.cookie_name.as_str();
    for cookie in cookie_header.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=')
            && name == cookie_name
        {
            let claims = verify_session_token(value, &config.secret_key)?;
            return Ok(Some(claims));
        }
    }

    Ok(None)
}

/// The authenticated user behind the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserDBResponse);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let claims = try_jwt_session_auth(parts, &state.config)?.ok_or(Error::Unauthenticated {
            message: Some("Authentication required".to_string()),
        })?;

        let mut conn = state
            .db
            .acquire()
            .await
            .map_err(crate::db::errors::DbError::from)?;
        let user = Users::new(&mut conn)
            .get_by_id(claims.sub)
            .await?
            // A valid token for a deleted user is still not a session.
            .ok_or(Error::Unauthenticated {
                message: Some("Authentication required".to_string()),
            })?;

        Ok(CurrentUser(user))
    }
}

/// An authenticated user who also holds the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub UserDBResponse);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role != Role::Admin {
            return Err(Error::Forbidden {
                message: "Admin access required".to_string(),
            });
        }

        Ok(AdminUser(user))
    }
}
