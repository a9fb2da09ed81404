use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// `page`/`limit` query parameters. Missing values fall back to the
/// defaults; out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }
}

/// One page of a listing plus the numbers a client needs to walk it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_items: u64) -> Self {
        let page = request.page();
        let limit = request.limit();
        let total_pages = total_items.div_ceil(u64::from(limit)) as u32;
        Self {
            items,
            page,
            limit,
            total_items,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }

    /// Slice an already-ordered collection.
    pub fn from_slice(all: &[T], request: &PageRequest) -> Self
    where
        T: Clone,
    {
        let items = all
            .iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .cloned()
            .collect();
        Self::new(items, request, all.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_missing() {
        let request = PageRequest::default();
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), 10);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn limit_is_capped_and_page_floored() {
        let request = PageRequest::new(0, 500);
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), MAX_LIMIT);

        let request = PageRequest::new(3, 0);
        assert_eq!(request.limit(), 1);
        assert_eq!(request.offset(), 2);
    }

    #[test]
    fn page_metadata_reflects_position() {
        let all: Vec<u32> = (0..25).collect();
        let page = Page::from_slice(&all, &PageRequest::new(2, 10));
        assert_eq!(page.items, (10..20).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next_page);
        assert!(page.has_prev_page);

        let last = Page::from_slice(&all, &PageRequest::new(3, 10));
        assert_eq!(last.items.len(), 5);
        assert!(!last.has_next_page);
    }

    #[test]
    fn empty_listing_has_no_pages() {
        let page = Page::<u32>::from_slice(&[], &PageRequest::default());
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next_page);
        assert!(!page.has_prev_page);
    }
}
