#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod limits;
pub mod page;
pub mod params;
pub mod query;
pub mod sort;

pub use limits::QueryLimits;
pub use page::{Page, Pagination};
pub use params::ListParams;
pub use query::Query;
pub use sort::{Field, FieldMap, Orderable, SortValue};

/// Default page size when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Default `orderBy` column of list requests
pub const DEFAULT_ORDER_BY: &str = "CreatedDate";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SortDir {
    #[serde(rename = "asc")]
    Asc,
    #[default]
    #[serde(rename = "desc")]
    Desc,
}

impl SortDir {
    /// Parse a textual direction. Only `desc` (any case) sorts descending,
    /// every other value falls back to ascending.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case("desc") {
            SortDir::Desc
        } else {
            if !text.eq_ignore_ascii_case("asc") {
                tracing::debug!(direction = text, "unrecognized sort direction, using ascending");
            }
            SortDir::Asc
        }
    }

    #[must_use]
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending { SortDir::Asc } else { SortDir::Desc }
    }

    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }

    #[must_use]
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    }
}

impl std::fmt::Display for SortDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDir::Asc => write!(f, "asc"),
            SortDir::Desc => write!(f, "desc"),
        }
    }
}

/// Client-input faults raised while shaping a list query.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unsupported sort field: {0}")]
    InvalidOrderByField(String),

    #[error("pageNumber must be 1 or greater")]
    InvalidPageNumber,

    #[error("pageSize {requested} exceeds the maximum of {max}")]
    InvalidPageSize { requested: u32, max: u32 },

    #[error("searchKeyword exceeds the maximum length of {max} characters")]
    SearchTooLong { max: usize },
}

impl Error {
    /// Wire name of the offending parameter
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Error::InvalidOrderByField(_) => "orderBy",
            Error::InvalidPageNumber => "pageNumber",
            Error::InvalidPageSize { .. } => "pageSize",
            Error::SearchTooLong { .. } => "searchKeyword",
        }
    }
}
