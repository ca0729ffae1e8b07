//! Page requests and page results
//!
//! Pages are 0-indexed, matching the `page`/`size` query parameters and the
//! `Link` header URIs.

use serde::Deserialize;

/// Maximum items per page
const MAX_PAGE_SIZE: u32 = 2000;

/// Default items per page
const DEFAULT_PAGE_SIZE: u32 = 20;

/// A request for one page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pageable {
    /// Page number (0-indexed)
    pub page: u32,
    /// Items per page (1..=2000)
    pub size: u32,
}

impl Pageable {
    /// Create a page request. A zero `size` falls back to the default,
    /// larger ones are capped at 2000.
    pub fn new(page: u32, size: u32) -> Self {
        let size = if size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            size.min(MAX_PAGE_SIZE)
        };
        Self { page, size }
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> u32 {
        self.size
    }
}

impl Default for Pageable {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Query parameters for pagination
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageableParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl From<PageableParams> for Pageable {
    fn from(params: PageableParams) -> Self {
        Self::new(
            params.page.unwrap_or(0),
            params.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

/// One page of results plus the total across all pages
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, pageable: Pageable) -> Self {
        Self {
            content,
            total_elements,
            page: pageable.page,
            size: pageable.size,
        }
    }

    /// Total number of pages; 0 when there are no elements.
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 1;
        }
        self.total_elements.div_ceil(u64::from(self.size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    /// Index of the last page, 0 when empty.
    pub fn last_page(&self) -> u64 {
        self.total_pages().saturating_sub(1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            page: self.page,
            size: self.size,
        }
    }
}
