//! Database layer.
//!
//! Structured as repositories over Postgres via sqlx:
//!
//! - `errors`: driver errors mapped to a small [`errors::DbError`] enum
//! - `models`: row-shaped request/response types per table
//! - `handlers`: the repositories themselves
//!
//! The API layer owns connection acquisition and transactions; repositories
//! only ever borrow a connection.

pub mod errors;
pub mod handlers;
pub mod models;
