//! Deferred list query over an in-memory source.
//!
//! Building a [`Query`] records filters, ordering keys and the page window.
//! Nothing is evaluated until [`Query::fetch`] walks the source.

use std::cmp::Ordering;

use crate::SortDir;
use crate::page::{Page, Pagination};
use crate::sort::{Field, Orderable};

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

#[must_use]
pub struct Query<T> {
    predicates: Vec<Predicate<T>>,
    order: Vec<(Field<T>, SortDir)>,
    pagination: Pagination,
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self {
            predicates: Vec::new(),
            order: Vec::new(),
            pagination: Pagination::unbounded(),
        }
    }
}

impl<T> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("filters", &self.predicates.len())
            .field("order", &self.order)
            .field("pagination", &self.pagination)
            .finish()
    }
}

impl<T> Query<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only items matching `predicate`. Filters are AND-ed.
    pub fn filter<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Box::new(predicate));
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    #[must_use]
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    #[must_use]
    pub fn is_ordered(&self) -> bool {
        !self.order.is_empty()
    }

    #[must_use]
    pub fn matches(&self, item: &T) -> bool {
        self.predicates.iter().all(|p| p(item))
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.order
            .iter()
            .fold(Ordering::Equal, |acc, (field, dir)| {
                acc.then_with(|| field.compare(a, b, *dir))
            })
    }

    /// Count matches without ordering or paging.
    #[must_use]
    pub fn count<I>(&self, source: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        source.into_iter().filter(|item| self.matches(item)).count()
    }

    /// Run the query: filter, order (stable), take the total, then page.
    #[must_use]
    pub fn fetch<I>(&self, source: I) -> Page<T>
    where
        I: IntoIterator<Item = T>,
    {
        let mut matched: Vec<T> = source.into_iter().filter(|item| self.matches(item)).collect();
        if self.is_ordered() {
            matched.sort_by(|a, b| self.compare(a, b));
        }
        let total = u64::try_from(matched.len()).unwrap_or(u64::MAX);
        let items = self.pagination.apply(matched).collect();
        Page::new(items, total, self.pagination)
    }
}

impl<T> Orderable<T> for Query<T> {
    /// Appends a sort key. Earlier keys take precedence.
    fn order_by(mut self, field: Field<T>, dir: SortDir) -> Self {
        self.order.push((field, dir));
        self
    }
}
