//! Pagination primitives shared across all list views.

use serde::{Deserialize, Serialize};

/// Pagination query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl Pagination {
    /// Maximum items per page.
    pub const MAX_PER_PAGE: usize = 100;

    /// Page size, falling back to `default_per_page` and clamped to `1..=MAX_PER_PAGE`.
    pub fn limit(&self, default_per_page: usize) -> usize {
        self.per_page
            .unwrap_or(default_per_page)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    pub fn current_page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }
}

/// One page of rows plus the totals a pager needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// Number of pages for `total` rows; never less than one.
pub fn total_pages(total: usize, per_page: usize) -> usize {
    let per_page = per_page.max(1);
    total.div_ceil(per_page).max(1)
}

/// Slice `items` into the requested 1-based page.
///
/// A page past the end yields an empty slice; callers clamp the page index.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> PagedResult<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total = items.len();
    let start = (page - 1).saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);
    PagedResult {
        items: items[start..end].to_vec(),
        total,
        page,
        per_page,
        total_pages: total_pages(total, per_page),
    }
}
