//! Page-based pagination for the public listings.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Fixed page size for public post and comment listings.
pub const PAGE_SIZE: i64 = 5;

/// `?page=N` query parameter. Pages are 1-based; missing or nonsensical
/// values fall back to the first page.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> i64 {
        // Absurdly large page numbers saturate instead of overflowing, so
        // the query runs and returns an empty page.
        (self.page() - 1).saturating_mul(PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageMeta {
    /// Total matching records, before paging.
    pub total: i64,
    pub page: i64,
    /// Highest page with any content. Zero when there are no records.
    pub last_page: i64,
}

impl PageMeta {
    pub fn new(total: i64, page: i64) -> Self {
        Self {
            total,
            page,
            last_page: (total + PAGE_SIZE - 1) / PAGE_SIZE,
        }
    }
}

/// A page of results plus the metadata a client needs to render pagers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T: ToSchema> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_to_one() {
        let q = PageQuery { page: None };
        assert_eq!(q.page(), 1);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn nonsense_pages_clamp_to_one() {
        for bad in [0, -1, -100] {
            let q = PageQuery { page: Some(bad) };
            assert_eq!(q.page(), 1, "page {bad}");
        }
    }

    #[test]
    fn offset_follows_fixed_page_size() {
        let q = PageQuery { page: Some(3) };
        assert_eq!(q.offset(), 2 * PAGE_SIZE);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let q = PageQuery {
            page: Some(i64::MAX),
        };
        assert_eq!(q.offset(), i64::MAX);
    }

    #[test]
    fn last_page_rounds_up() {
        assert_eq!(PageMeta::new(0, 1).last_page, 0);
        assert_eq!(PageMeta::new(1, 1).last_page, 1);
        assert_eq!(PageMeta::new(5, 1).last_page, 1);
        assert_eq!(PageMeta::new(6, 1).last_page, 2);
        assert_eq!(PageMeta::new(11, 1).last_page, 3);
    }
}
