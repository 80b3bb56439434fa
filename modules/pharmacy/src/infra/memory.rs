use anyhow::bail;
use async_trait::async_trait;
use parking_lot::RwLock;
use rxkit_query::{Page, Query};
use uuid::Uuid;

use crate::domain::entity::Entity;
use crate::domain::repo::Repository;

/// Process-local store. Rows keep insertion order, so an unordered query
/// returns them oldest first.
pub struct InMemoryRepository<E> {
    rows: RwLock<Vec<E>>,
}

impl<E> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<E: Entity> std::fmt::Debug for InMemoryRepository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("collection", &E::COLLECTION)
            .field("rows", &self.rows.read().len())
            .finish()
    }
}

impl<E: Entity> InMemoryRepository<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn query(&self, tenant: Uuid, query: Query<E>) -> anyhow::Result<Page<E>> {
        let rows: Vec<E> = self
            .rows
            .read()
            .iter()
            .filter(|row| row.organization_id() == tenant)
            .cloned()
            .collect();
        Ok(query.fetch(rows))
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<E>> {
        Ok(self.rows.read().iter().find(|row| row.id() == id).cloned())
    }

    async fn insert(&self, entity: E) -> anyhow::Result<E> {
        let mut rows = self.rows.write();
        if rows.iter().any(|row| row.id() == entity.id()) {
            bail!("{} {} already exists", E::LABEL, entity.id());
        }
        rows.push(entity.clone());
        Ok(entity)
    }

    async fn delete(&self, tenant: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|row| row.id() != id || row.organization_id() != tenant);
        Ok(rows.len() < before)
    }
}
