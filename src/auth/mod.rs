//! Authentication and authorization.
//!
//! Native email/password accounts with stateless JWT cookie sessions:
//!
//! - `password`: Argon2id hashing and verification
//! - `session`: signing and verifying session tokens
//! - `current_user`: axum extractors gating routes on session and role
//! - `validation`: registration input checks
//!
//! Handlers never touch tokens or hashes directly; they take a
//! [`current_user::CurrentUser`] or [`current_user::AdminUser`] argument
//! and let the extractor do the work.

pub mod current_user;
pub mod password;
pub mod session;
pub mod validation;

pub use current_user::{AdminUser, CurrentUser};
