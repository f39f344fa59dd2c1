//! API error types and their HTTP mappings.
//!
//! Every handler returns [`Result`]; the [`IntoResponse`] impl turns an
//! [`Error`] into a JSON body of the shape `{"message": "..."}` with the
//! appropriate status code, and logs it at a severity matching who is at
//! fault (server errors loudly, client mistakes quietly).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::errors::DbError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unauthenticated")]
    Unauthenticated { message: Option<String> },

    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("internal error during {operation}")]
    Internal { operation: String },

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            // Duplicate-key conflicts surface as plain client errors.
            Error::Conflict { .. } => StatusCode::BAD_REQUEST,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. }
                | DbError::ForeignKeyViolation { .. }
                | DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message exposed to the client. Internal detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message
                .clone()
                .unwrap_or_else(|| "Authentication required".to_string()),
            Error::Forbidden { message } => message.clone(),
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} not found: {id}"),
            Error::Conflict { message } => message.clone(),
            Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { table, .. } => match table.as_deref() {
                    Some("users") => "Email address is already registered".to_string(),
                    _ => "Resource already exists".to_string(),
                },
                DbError::ForeignKeyViolation { table, .. } => match table.as_deref() {
                    Some("comments") => "Referenced post does not exist".to_string(),
                    _ => "Referenced resource does not exist".to_string(),
                },
                DbError::CheckViolation { .. } => "Invalid field value".to_string(),
                DbError::Other(_) => "Internal server error".to_string(),
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.user_message();

        match &self {
            Error::Internal { .. } | Error::Other(_) => {
                tracing::error!(error = %self, "internal server error");
            }
            Error::Database(DbError::Other(_)) => {
                tracing::error!(error = %self, "database error");
            }
            Error::Database(db_err) => {
                tracing::warn!(error = %db_err, "database constraint error");
            }
            Error::Conflict { .. } => {
                tracing::warn!(error = %self, "conflict");
            }
            Error::Unauthenticated { .. } | Error::Forbidden { .. } => {
                tracing::warn!(error = %self, "authorization failure");
            }
            Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!(error = %self, "client error");
            }
        }

        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
