//! Database repositories.
//!
//! Each repository wraps a `&mut PgConnection` for its lifetime and speaks
//! the types in `crate::db::models`. All of them implement the common
//! [`Repository`] trait for basic CRUD, plus domain-specific queries
//! (approval flips, owner joins, counts) as inherent methods.

pub mod comments;
pub mod posts;
pub mod repository;
pub mod users;

pub use comments::Comments;
pub use posts::Posts;
pub use repository::Repository;
pub use users::Users;
