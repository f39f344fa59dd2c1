//! HTTP API layer.
//!
//! ```text
//! request -> router -> extractors (session, role) -> handler -> repository
//! ```
//!
//! - `models`: wire-format types, documented with utoipa schemas
//! - `handlers`: the endpoints themselves
//!
//! Routing itself is assembled in `crate::build_router`.

pub mod handlers;
pub mod models;
