//! Database error types.
//!
//! Maps driver-level failures onto a small set of variants the API layer
//! can translate into HTTP responses without inspecting SQLSTATE codes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violation: {message}")]
    UniqueViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    #[error("foreign key constraint violation: {message}")]
    ForeignKeyViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    #[error("check constraint violation: {message}")]
    CheckViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().map(String::from);
                let table = db_err.table().map(String::from);
                let message = db_err.message().to_string();

                if db_err.is_unique_violation() {
                    DbError::UniqueViolation {
                        constraint,
                        table,
                        message,
                    }
                } else if db_err.is_foreign_key_violation() {
                    DbError::ForeignKeyViolation {
                        constraint,
                        table,
                        message,
                    }
                } else if db_err.is_check_violation() {
                    DbError::CheckViolation {
                        constraint,
                        table,
                        message,
                    }
                } else {
                    DbError::Other(anyhow::anyhow!("database error: {message}"))
                }
            }
            other => DbError::Other(anyhow::Error::from(other)),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
