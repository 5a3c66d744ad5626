//! Pagination for list surfaces.

use serde::{Deserialize, Serialize};

/// Default page size when none is requested.
pub const DEFAULT_LIMIT: u32 = 20;

/// Upper bound on page size.
pub const MAX_LIMIT: u32 = 100;

/// A pagination request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_LIMIT }
    }
}

impl PageRequest {
    /// Creates a request, clamping page to at least 1 and limit to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Index of the first item on this page.
    #[must_use]
    pub const fn offset(self) -> usize {
        (self.page.saturating_sub(1) * self.limit) as usize
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub limit: u32,
    /// Total matching items across all pages.
    pub total: usize,
    /// Total number of pages.
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Slices a fully materialized result set into one page.
    #[must_use]
    pub fn from_vec(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len();
        let total_pages = (total as u32).div_ceil(request.limit).max(1);
        let offset = request.offset();
        let page_items: Vec<T> = items
            .into_iter()
            .skip(offset)
            .take(request.limit as usize)
            .collect();
        Self {
            items: page_items,
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
        }
    }

    /// Maps page items to another type, preserving the page envelope.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}
