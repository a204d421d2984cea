//! Pagination types.
//!
//! [`PageRequest`] carries the page index and size exactly as the caller set
//! them; the accessor methods return the effective, clamped values.

use serde::{Deserialize, Serialize};

/// Index of the first page.
pub const FIRST_PAGE: i64 = 0;

/// Page size used when none (or an out-of-range one) is requested.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Smallest accepted page size.
pub const MIN_PAGE_SIZE: i64 = 1;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Requested page index and size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index.
    #[serde(default)]
    pub page: i64,
    /// Number of items per page.
    #[serde(default)]
    pub size: i64,
}

impl PageRequest {
    /// Create a page request.
    #[must_use]
    pub const fn new(page: i64, size: i64) -> Self {
        Self { page, size }
    }

    /// Effective page index, never below [`FIRST_PAGE`].
    #[must_use]
    pub const fn page(&self) -> i64 {
        if self.page < FIRST_PAGE {
            FIRST_PAGE
        } else {
            self.page
        }
    }

    /// Effective page size.
    ///
    /// Sizes within `[MIN_PAGE_SIZE, MAX_PAGE_SIZE]` pass through; anything
    /// else, including an unset size of `0`, yields [`DEFAULT_PAGE_SIZE`].
    #[must_use]
    pub const fn size(&self) -> i64 {
        if self.size < MIN_PAGE_SIZE || self.size > MAX_PAGE_SIZE {
            DEFAULT_PAGE_SIZE
        } else {
            self.size
        }
    }

    /// Maximum number of items to return; same as [`PageRequest::size`].
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.size()
    }

    /// Number of items to skip, saturating at `i64::MAX`.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.page().saturating_mul(self.size())
    }
}

/// A returned page: the page request it answers plus the total item count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResource {
    /// Page index and size of this page.
    #[serde(flatten)]
    pub request: PageRequest,
    /// Total number of items across all pages.
    #[serde(default)]
    pub total: i64,
}

impl PageResource {
    /// Create a page resource.
    #[must_use]
    pub const fn new(request: PageRequest, total: i64) -> Self {
        Self { request, total }
    }
}
