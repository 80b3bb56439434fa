use rxkit::RequestError;
use rxkit_query::FieldMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use uuid::Uuid;

use super::access::Access;

/// Server-assigned columns of a new record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub created_date: OffsetDateTime,
}

impl Stamp {
    /// Fresh id, created now, owned by `organization_id`
    #[must_use]
    pub fn new(organization_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            created_date: OffsetDateTime::now_utc(),
        }
    }
}

/// A tenant-owned record type exposed as a REST collection.
pub trait Entity: Clone + Serialize + Send + Sync + 'static {
    /// URL segment, e.g. `wards`
    const COLLECTION: &'static str;
    /// Singular noun for messages, e.g. `ward`
    const LABEL: &'static str;

    /// Client-supplied payload for creation
    type Input: DeserializeOwned + Send + 'static;

    fn id(&self) -> Uuid;
    fn organization_id(&self) -> Uuid;
    fn created_date(&self) -> OffsetDateTime;

    /// Sortable columns
    fn fields() -> &'static FieldMap<Self>;

    /// Keyword search over the record's text. `needle` is lowercase.
    fn matches_keyword(&self, needle: &str) -> bool;

    fn access() -> Access;

    /// Validate `input` and build the record.
    ///
    /// # Errors
    /// `InvalidArgument` listing every offending field.
    fn create(input: Self::Input, stamp: Stamp) -> Result<Self, RequestError>;
}

/// Case-insensitive containment against an already lowercased needle
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
