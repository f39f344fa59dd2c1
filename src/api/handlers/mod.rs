//! HTTP request handlers.
//!
//! Grouped by audience: `auth`, `posts`, `comments`, `profiles` and
//! `uploads` serve regular accounts (and, where noted, anonymous
//! visitors), while `admin` is role-gated moderation and user
//! management. Handlers validate input, authorize, and delegate to the
//! repositories in `crate::db`; no SQL lives here.

pub mod admin;
pub mod auth;
pub mod comments;
pub mod posts;
pub mod profiles;
pub mod uploads;
