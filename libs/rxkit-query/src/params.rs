use serde::{Deserialize, Serialize};

use crate::limits::QueryLimits;
use crate::page::Pagination;
use crate::{DEFAULT_ORDER_BY, DEFAULT_PAGE_SIZE, Error, SortDir};

/// List-request parameters as they arrive on the query string.
///
/// `sortDirection` wins over `sortByAscending` when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    pub page_number: u32,
    pub page_size: u32,
    pub order_by: Option<String>,
    pub sort_by_ascending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_keyword: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            order_by: Some(DEFAULT_ORDER_BY.to_owned()),
            sort_by_ascending: false,
            sort_direction: None,
            search_keyword: None,
        }
    }
}

impl ListParams {
    #[must_use]
    pub fn direction(&self) -> SortDir {
        match self.sort_direction.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => SortDir::parse(text),
            _ => SortDir::from_ascending(self.sort_by_ascending),
        }
    }

    #[must_use]
    pub fn order_by(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    /// Trimmed keyword, `None` when blank
    #[must_use]
    pub fn keyword(&self) -> Option<&str> {
        self.search_keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Check the parameters against `limits` and produce the page window.
    ///
    /// # Errors
    /// Returns the first offending parameter as an [`Error`].
    pub fn validate(&self, limits: &QueryLimits) -> Result<Pagination, Error> {
        let pagination = Pagination::new(self.page_number, self.page_size)?;
        limits.validate_page_size(self.page_size)?;
        if let Some(keyword) = self.keyword() {
            limits.validate_search(keyword)?;
        }
        Ok(pagination)
    }
}
