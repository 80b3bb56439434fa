//! Allow-list driven ordering.
//!
//! A [`FieldMap`] binds public, case-insensitive column names to typed value
//! extractors. Callers pass a client-supplied `orderBy` string and a direction;
//! anything outside the allow-list is rejected before any data is touched.

use std::cmp::Ordering;
use std::collections::HashMap;

use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{Error, SortDir};

/// A comparable projection of one entity property.
///
/// Values of different variants order by variant rank; `Null` sorts first.
/// Text compares case-insensitively.
#[derive(Debug, Clone, Copy)]
pub enum SortValue<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(&'a str),
    Uuid(Uuid),
    DateTime(OffsetDateTime),
    Date(Date),
}

impl SortValue<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Null => 0,
            SortValue::Bool(_) => 1,
            SortValue::Int(_) => 2,
            SortValue::Decimal(_) => 3,
            SortValue::Text(_) => 4,
            SortValue::Uuid(_) => 5,
            SortValue::DateTime(_) => 6,
            SortValue::Date(_) => 7,
        }
    }
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

impl Ord for SortValue<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Null, SortValue::Null) => Ordering::Equal,
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            (SortValue::Int(a), SortValue::Int(b)) => a.cmp(b),
            (SortValue::Decimal(a), SortValue::Decimal(b)) => a.cmp(b),
            (SortValue::Int(a), SortValue::Decimal(b)) => Decimal::from(*a).cmp(b),
            (SortValue::Decimal(a), SortValue::Int(b)) => a.cmp(&Decimal::from(*b)),
            (SortValue::Text(a), SortValue::Text(b)) => cmp_text(a, b),
            (SortValue::Uuid(a), SortValue::Uuid(b)) => a.cmp(b),
            (SortValue::DateTime(a), SortValue::DateTime(b)) => a.cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortValue<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue<'_> {}

impl<'a> From<&'a str> for SortValue<'a> {
    fn from(value: &'a str) -> Self {
        SortValue::Text(value)
    }
}

impl<'a> From<&'a String> for SortValue<'a> {
    fn from(value: &'a String) -> Self {
        SortValue::Text(value.as_str())
    }
}

impl From<bool> for SortValue<'_> {
    fn from(value: bool) -> Self {
        SortValue::Bool(value)
    }
}

impl From<i32> for SortValue<'_> {
    fn from(value: i32) -> Self {
        SortValue::Int(i64::from(value))
    }
}

impl From<i64> for SortValue<'_> {
    fn from(value: i64) -> Self {
        SortValue::Int(value)
    }
}

impl From<Decimal> for SortValue<'_> {
    fn from(value: Decimal) -> Self {
        SortValue::Decimal(value)
    }
}

impl From<Uuid> for SortValue<'_> {
    fn from(value: Uuid) -> Self {
        SortValue::Uuid(value)
    }
}

impl From<OffsetDateTime> for SortValue<'_> {
    fn from(value: OffsetDateTime) -> Self {
        SortValue::DateTime(value)
    }
}

impl From<Date> for SortValue<'_> {
    fn from(value: Date) -> Self {
        SortValue::Date(value)
    }
}

impl<'a, V> From<Option<V>> for SortValue<'a>
where
    V: Into<SortValue<'a>>,
{
    fn from(value: Option<V>) -> Self {
        value.map_or(SortValue::Null, Into::into)
    }
}

/// Projection of an entity onto a sortable value
pub type Extractor<T> = for<'a> fn(&'a T) -> SortValue<'a>;

/// One allow-listed sort column.
pub struct Field<T> {
    name: &'static str,
    extract: Extractor<T>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            extract: self.extract,
        }
    }
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T> Field<T> {
    #[must_use]
    pub fn new(name: &'static str, extract: Extractor<T>) -> Self {
        Self { name, extract }
    }

    /// Canonical column name as registered
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn value<'a>(&self, item: &'a T) -> SortValue<'a> {
        (self.extract)(item)
    }

    #[must_use]
    pub fn compare(&self, a: &T, b: &T, dir: SortDir) -> Ordering {
        dir.apply(self.value(a).cmp(&self.value(b)))
    }
}

/// Anything that can accept an ordering step: an in-memory `Vec`, or a lazy
/// [`Query`](crate::Query) that records the key and sorts on execution.
pub trait Orderable<T>: Sized {
    #[must_use]
    fn order_by(self, field: Field<T>, dir: SortDir) -> Self;
}

impl<T> Orderable<T> for Vec<T> {
    fn order_by(mut self, field: Field<T>, dir: SortDir) -> Self {
        // sort_by is stable, equal keys keep their input order
        self.sort_by(|a, b| field.compare(a, b, dir));
        self
    }
}

/// Case-insensitive allow-list of sortable columns for one entity type.
pub struct FieldMap<T> {
    map: HashMap<String, Field<T>>,
}

impl<T> Default for FieldMap<T> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<T> std::fmt::Debug for FieldMap<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl<T> FieldMap<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn insert(mut self, name: &'static str, extract: Extractor<T>) -> Self {
        self.map
            .insert(name.to_lowercase(), Field::new(name, extract));
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Field<T>> {
        self.map.get(&name.trim().to_lowercase()).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names, sorted for stable output
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.map.values().map(Field::name).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a client-supplied `orderBy`. A missing or blank name resolves to
    /// `None`, an unknown name is an error.
    ///
    /// # Errors
    /// [`Error::InvalidOrderByField`] when the name is not allow-listed.
    pub fn resolve(&self, order_by: Option<&str>) -> Result<Option<Field<T>>, Error> {
        let Some(name) = order_by.map(str::trim).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };
        self.get(name)
            .map(Some)
            .ok_or_else(|| Error::InvalidOrderByField(name.to_owned()))
    }

    /// Order `source` by the named column. The source comes back unchanged for
    /// a blank name.
    ///
    /// # Errors
    /// [`Error::InvalidOrderByField`] when the name is not allow-listed.
    pub fn apply<S>(&self, source: S, order_by: Option<&str>, dir: SortDir) -> Result<S, Error>
    where
        S: Orderable<T>,
    {
        match self.resolve(order_by)? {
            Some(field) => {
                tracing::trace!(field = field.name(), %dir, "applying sort");
                Ok(source.order_by(field, dir))
            }
            None => Ok(source),
        }
    }
}
