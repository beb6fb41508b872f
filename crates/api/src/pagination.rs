//! Page arithmetic for the list views.

use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Entries per page when `page_size` is not given.
pub const DEFAULT_PAGE_SIZE: i64 = 15;

/// Upper bound for `page_size`.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Splits a result set of known size into fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: i64,
}

impl Paginator {
    /// Build a paginator, clamping the requested size to `1..=MAX_PAGE_SIZE`.
    pub fn new(page_size: Option<i64>) -> Self {
        Self {
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Metadata for 1-based `page` over `hits` results.
    ///
    /// An empty result set still has one (empty) page. Any page outside
    /// `1..=pages` is a not-found error.
    pub fn page(&self, hits: i64, page: Option<i64>) -> AppResult<PageMeta> {
        let pages = if hits == 0 {
            1
        } else {
            (hits + self.page_size - 1) / self.page_size
        };
        let page = page.unwrap_or(1);
        if page < 1 || page > pages {
            return Err(AppError::NotFound(format!("Page {page} not found")));
        }

        let offset = (page - 1) * self.page_size;
        let (first_on_page, last_on_page) = if hits == 0 {
            (0, 0)
        } else {
            (offset + 1, (offset + self.page_size).min(hits))
        };

        Ok(PageMeta {
            page,
            pages,
            hits,
            page_size: self.page_size,
            has_next: page < pages,
            has_previous: page > 1,
            next: (page < pages).then_some(page + 1),
            previous: (page > 1).then_some(page - 1),
            first_on_page,
            last_on_page,
        })
    }
}

/// Pagination metadata returned alongside each page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub pages: i64,
    pub hits: i64,
    pub page_size: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    /// 1-based index of the first result on this page (0 when empty).
    pub first_on_page: i64,
    /// 1-based index of the last result on this page (0 when empty).
    pub last_on_page: i64,
}

impl PageMeta {
    /// Row offset of this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}
