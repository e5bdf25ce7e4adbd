//! Common functionality for paging list data.

use serde::Serialize;

use crate::Error;

/// The page number to default to when not specified in a request.
pub const DEFAULT_PAGE: u64 = 1;
/// The number of rows per page when not specified in a request.
pub const DEFAULT_LIMIT: u64 = 50;
/// The most rows a single page may request.
pub const MAX_LIMIT: u64 = 500;

/// A validated page/limit pair taken from query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The 1-based page number.
    pub page: u64,
    /// The number of rows per page.
    pub limit: u64,
}

impl PageRequest {
    /// Validate raw `page` and `limit` query parameters, applying defaults
    /// for absent values.
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Result<PageRequest, Error> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page == 0 {
            return Err(Error::InvalidPageParameter("page"));
        }

        if limit == 0 || limit > MAX_LIMIT {
            return Err(Error::InvalidPageParameter("limit"));
        }

        Ok(PageRequest { page, limit })
    }

    /// The number of rows to skip to reach this page.
    pub fn offset(self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// The pagination block included in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// The 1-based page number that was served.
    pub page: u64,
    /// The page size that was applied.
    pub limit: u64,
    /// The total number of rows matching the filter.
    pub total: u64,
    /// The total number of pages, i.e. `ceil(total / limit)`.
    pub pages: u64,
}

impl Pagination {
    /// Describe the page of a result set with `total` matching rows.
    pub fn describe(request: PageRequest, total: u64) -> Pagination {
        Pagination {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(request.limit),
        }
    }
}
