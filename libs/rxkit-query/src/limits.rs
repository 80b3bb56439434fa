//! Safety caps on client-supplied list parameters.

use serde::Deserialize;

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryLimits {
    /// Largest accepted `pageSize` (default: 1000)
    pub max_page_size: u32,
    /// Longest accepted `searchKeyword` in characters (default: 200)
    pub max_search_length: usize,
    /// Whether `pageSize = 0` may return every row (default: true)
    pub allow_unbounded: bool,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_page_size: 1000,
            max_search_length: 200,
            allow_unbounded: true,
        }
    }
}

impl QueryLimits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_page_size(mut self, max: u32) -> Self {
        self.max_page_size = max;
        self
    }

    #[must_use]
    pub fn with_max_search_length(mut self, max: usize) -> Self {
        self.max_search_length = max;
        self
    }

    #[must_use]
    pub fn with_unbounded(mut self, allow: bool) -> Self {
        self.allow_unbounded = allow;
        self
    }

    /// # Errors
    /// [`Error::InvalidPageSize`] when the size is over the cap, or zero while
    /// unbounded pages are disabled.
    pub fn validate_page_size(&self, page_size: u32) -> Result<(), Error> {
        let too_big = page_size > self.max_page_size;
        let unbounded_denied = page_size == 0 && !self.allow_unbounded;
        if too_big || unbounded_denied {
            return Err(Error::InvalidPageSize {
                requested: page_size,
                max: self.max_page_size,
            });
        }
        Ok(())
    }

    /// # Errors
    /// [`Error::SearchTooLong`] when the keyword exceeds the cap.
    pub fn validate_search(&self, keyword: &str) -> Result<(), Error> {
        if keyword.chars().count() > self.max_search_length {
            return Err(Error::SearchTooLong {
                max: self.max_search_length,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let l = QueryLimits::default();
        assert_eq!(l.max_page_size, 1000);
        assert_eq!(l.max_search_length, 200);
        assert!(l.allow_unbounded);
    }

    #[test]
    fn page_size_cap() {
        let l = QueryLimits::new().with_max_page_size(10);
        assert!(l.validate_page_size(10).is_ok());
        assert_eq!(
            l.validate_page_size(11),
            Err(Error::InvalidPageSize {
                requested: 11,
                max: 10
            })
        );
    }

    #[test]
    fn zero_page_size_obeys_unbounded_flag() {
        assert!(QueryLimits::new().validate_page_size(0).is_ok());
        assert!(
            QueryLimits::new()
                .with_unbounded(false)
                .validate_page_size(0)
                .is_err()
        );
    }

    #[test]
    fn search_length_counts_chars() {
        let l = QueryLimits::new().with_max_search_length(3);
        assert!(l.validate_search("abc").is_ok());
        assert_eq!(l.validate_search("abcd"), Err(Error::SearchTooLong { max: 3 }));
    }

    #[test]
    fn deserializes_partial_config() {
        let l: QueryLimits = serde_json::from_str(r#"{"max_page_size": 25}"#).unwrap();
        assert_eq!(l.max_page_size, 25);
        assert_eq!(l.max_search_length, 200);
    }
}
