//! Shared identifier types used across the API and database layers.

use uuid::Uuid;

pub type UserId = Uuid;
pub type PostId = Uuid;
pub type CommentId = Uuid;

/// Shorten a UUID to its first 8 characters for log output.
pub fn abbrev_uuid(id: &Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbrev_uuid_truncates_to_eight_chars() {
        let id = Uuid::new_v4();
        let short = abbrev_uuid(&id);
        assert_eq!(short.len(), 8);
        assert!(id.to_string().starts_with(&short));
    }
}
