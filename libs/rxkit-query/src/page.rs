use serde::{Deserialize, Serialize};

use crate::{DEFAULT_PAGE_SIZE, Error};

/// Page window over an ordered result. `page_number` is 1-based, a
/// `page_size` of zero disables paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPagination")]
pub struct Pagination {
    page_number: u32,
    page_size: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPagination {
    page_number: u32,
    page_size: u32,
}

impl TryFrom<RawPagination> for Pagination {
    type Error = Error;

    fn try_from(raw: RawPagination) -> Result<Self, Error> {
        Self::new(raw.page_number, raw.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// # Errors
    /// [`Error::InvalidPageNumber`] when `page_number` is zero.
    pub fn new(page_number: u32, page_size: u32) -> Result<Self, Error> {
        if page_number == 0 {
            return Err(Error::InvalidPageNumber);
        }
        Ok(Self {
            page_number,
            page_size,
        })
    }

    /// Everything in a single page
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            page_number: 1,
            page_size: 0,
        }
    }

    #[must_use]
    pub fn page_number(self) -> u32 {
        self.page_number
    }

    #[must_use]
    pub fn page_size(self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn is_unbounded(self) -> bool {
        self.page_size == 0
    }

    /// Rows skipped before this page
    #[must_use]
    pub fn offset(self) -> usize {
        if self.is_unbounded() {
            return 0;
        }
        to_usize(self.page_number.saturating_sub(1)).saturating_mul(to_usize(self.page_size))
    }

    /// Maximum rows in this page, `None` when unbounded
    #[must_use]
    pub fn limit(self) -> Option<usize> {
        (!self.is_unbounded()).then(|| to_usize(self.page_size))
    }

    /// Slice an ordered iterator down to this page.
    pub fn apply<I>(self, iter: I) -> impl Iterator<Item = I::Item>
    where
        I: IntoIterator,
    {
        iter.into_iter()
            .skip(self.offset())
            .take(self.limit().unwrap_or(usize::MAX))
    }
}

fn to_usize(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// One page of results plus the total number of matches before paging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total_count: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total_count,
            page_number: pagination.page_number,
            page_size: pagination.page_size,
        }
    }

    #[must_use]
    pub fn empty(pagination: Pagination) -> Self {
        Self::new(Vec::new(), 0, pagination)
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        match self.page_size {
            0 => u64::from(self.total_count > 0),
            size => self.total_count.div_ceil(u64::from(size)),
        }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page_number) < self.total_pages()
    }

    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}
