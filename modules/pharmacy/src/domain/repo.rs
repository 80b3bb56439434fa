use async_trait::async_trait;
use rxkit_query::{Page, Query};
use uuid::Uuid;

use super::entity::Entity;

/// Storage for one entity type.
///
/// Every tenant-facing method takes the caller's organization and never sees
/// rows of another tenant.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Run `query` over the tenant's rows
    async fn query(&self, tenant: Uuid, query: Query<E>) -> anyhow::Result<Page<E>>;

    /// Lookup by id across tenants. For trusted internal callers only.
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<E>>;

    async fn insert(&self, entity: E) -> anyhow::Result<E>;

    /// Remove a tenant's row. Returns whether it existed.
    async fn delete(&self, tenant: Uuid, id: Uuid) -> anyhow::Result<bool>;

    async fn find(&self, tenant: Uuid, id: Uuid) -> anyhow::Result<Option<E>> {
        Ok(self
            .get(id)
            .await?
            .filter(|entity| entity.organization_id() == tenant))
    }
}
