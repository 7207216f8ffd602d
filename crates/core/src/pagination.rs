//! Page requests and page summaries for list endpoints.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 100;

/// Requested page (1-based).
///
/// Raw values may be anything the client sent; call [`PageRequest::validate`] before
/// using them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Default and clamp: `page >= 1`, `1 <= page_size <= max_page_size`.
    pub fn validate(self, max_page_size: i64) -> Self {
        let max = max_page_size.max(1);
        let page_size = if self.page_size <= 0 {
            DEFAULT_PAGE_SIZE.min(max)
        } else {
            self.page_size.min(max)
        };
        Self {
            page: self.page.max(1),
            page_size,
        }
    }

    /// Rows to skip. Only meaningful after `validate`.
    pub fn offset(&self) -> u64 {
        ((self.page.max(1) - 1) as u64).saturating_mul(self.page_size.max(0) as u64)
    }

    pub fn limit(&self) -> u64 {
        self.page_size.max(0) as u64
    }
}

/// Pagination summary returned alongside a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: i64,
    pub page_size: i64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PageInfo {
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        let size = request.limit().max(1);
        Self {
            page: request.page,
            page_size: request.page_size,
            total_items,
            total_pages: total_items.div_ceil(size),
        }
    }
}

/// One page of items plus its summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let req = PageRequest::new(None, None).validate(DEFAULT_MAX_PAGE_SIZE);
        assert_eq!(req, PageRequest { page: 1, page_size: 10 });
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn oversized_page_is_clamped_to_max() {
        let req = PageRequest::new(Some(3), Some(5000)).validate(50);
        assert_eq!(req.page_size, 50);
        assert_eq!(req.offset(), 100);
    }

    #[test]
    fn total_pages_rounds_up() {
        let req = PageRequest::new(Some(1), Some(10)).validate(100);
        assert_eq!(PageInfo::new(req, 0).total_pages, 0);
        assert_eq!(PageInfo::new(req, 10).total_pages, 1);
        assert_eq!(PageInfo::new(req, 11).total_pages, 2);
    }

    proptest! {
        #[test]
        fn validated_request_is_always_in_bounds(page in any::<i64>(), size in any::<i64>(), max in 1i64..1000) {
            let req = PageRequest::new(Some(page), Some(size)).validate(max);
            prop_assert!(req.page >= 1);
            prop_assert!(req.page_size >= 1 && req.page_size <= max);
        }
    }
}
