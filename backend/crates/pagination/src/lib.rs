//! Page/limit pagination primitives shared by blog backend list endpoints.
//!
//! List endpoints accept `page` and `limit` query parameters and answer with a
//! `{ "data": [...], "pagination": {...} }` envelope. This crate keeps the
//! parsing rules and the envelope shape in one place so every endpoint clamps
//! and reports pages identically.
//!
//! Raw query values are parsed leniently: anything that is not a positive
//! integer falls back to the endpoint default, and limits are capped.
//!
//! # Examples
//! ```
//! use pagination::{PageDefaults, PageRequest, Paginated};
//!
//! let request = PageRequest::from_raw(Some("2"), Some("500"), PageDefaults::STANDARD);
//! assert_eq!(request.limit(), 100);
//! assert_eq!(request.offset(), 100);
//!
//! let page = Paginated::new(vec!["a", "b"], request, 102);
//! assert!(page.pagination.has_prev);
//! assert!(!page.pagination.has_next);
//! ```

use serde::{Deserialize, Serialize};

/// Defaults and upper bound applied when parsing a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefaults {
    /// Page used when the caller omits or mangles the `page` parameter.
    pub page: u32,
    /// Limit used when the caller omits or mangles the `limit` parameter.
    pub limit: u32,
    /// Largest limit a caller may request.
    pub max_limit: u32,
}

impl PageDefaults {
    /// Defaults shared by most list endpoints: page 1, 10 items, at most 100.
    pub const STANDARD: Self = Self {
        page: 1,
        limit: 10,
        max_limit: 100,
    };

    /// Build defaults with a custom limit and cap.
    #[must_use]
    pub const fn with_limits(limit: u32, max_limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            max_limit,
        }
    }
}

/// Errors raised by the strict [`PageRequest::new`] constructor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// Pages are one-based.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("limit must be at least 1")]
    ZeroLimit,
    /// Requested limit exceeds the endpoint cap.
    #[error("limit must be at most {max}")]
    LimitTooLarge {
        /// The configured cap.
        max: u32,
    },
}

/// Validated one-based page request.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= limit <= max_limit` of the defaults it was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Strictly construct a page request.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when `page` or `limit` is zero or the limit
    /// exceeds `max_limit`.
    pub const fn new(page: u32, limit: u32, max_limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        if limit > max_limit {
            return Err(PageRequestError::LimitTooLarge { max: max_limit });
        }
        Ok(Self { page, limit })
    }

    /// Parse raw query values, substituting defaults for missing or invalid
    /// input and capping the limit.
    #[must_use]
    pub fn from_raw(page: Option<&str>, limit: Option<&str>, defaults: PageDefaults) -> Self {
        let page = parse_positive(page).unwrap_or(defaults.page).max(1);
        let limit = parse_positive(limit)
            .unwrap_or(defaults.limit)
            .clamp(1, defaults.max_limit.max(1));
        Self { page, limit }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items skipped before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.map(str::trim)
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
}

/// Pagination metadata returned alongside list data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current one-based page.
    pub page: u32,
    /// Page size used for the query.
    pub limit: u32,
    /// Total number of matching items.
    pub total: u64,
    /// Number of pages; never less than one.
    pub total_pages: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_prev: bool,
}

impl Pagination {
    /// Compute pagination metadata for `total` matching items.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(request.limit)).max(1);
        let page = u64::from(request.page);
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// List envelope: one page of data plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items on the requested page.
    pub data: Vec<T>,
    /// Metadata describing the page.
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    /// Wrap `data` with metadata computed from `request` and `total`.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            pagination: Pagination::new(request, total),
        }
    }

    /// Convert every item while keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
