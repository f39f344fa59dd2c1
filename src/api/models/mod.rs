//! Wire-format request and response types.
//!
//! Everything serialized to or from clients lives here, kept separate
//! from the row types in `crate::db::models`. Conversions between the
//! two layers are `From` impls on the API side.

pub mod comments;
pub mod pagination;
pub mod posts;
pub mod users;
