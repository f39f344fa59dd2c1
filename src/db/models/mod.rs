//! Database-facing request and response types.
//!
//! These mirror the table schemas and are distinct from the API models in
//! `crate::api::models`; handlers convert between the two at the boundary
//! so wire-format concerns never leak into SQL and vice versa.

pub mod comments;
pub mod posts;
pub mod users;
