//! One handler per entity type serving all four CRUD requests.

use std::sync::Arc;

use async_trait::async_trait;
use rxkit::{RequestContext, RequestError, RequestHandler, ResultEnvelope};
use rxkit_query::{Page, Query, QueryLimits};
use uuid::Uuid;

use super::entity::{Entity, Stamp};
use super::repo::Repository;
use super::requests::{CreateEntity, DeleteEntity, GetEntity, ListEntities};
use super::tenant::{Membership, storage};

/// Follow-up work after a record is stored. Failures are logged and never
/// undo the creation.
#[async_trait]
pub trait CreateHook<E: Entity>: Send + Sync {
    async fn created(&self, entity: &E, ctx: &RequestContext) -> anyhow::Result<()>;
}

pub struct EntityHandler<E: Entity> {
    repo: Arc<dyn Repository<E>>,
    limits: QueryLimits,
    membership: Arc<Membership>,
    hook: Option<Arc<dyn CreateHook<E>>>,
}

impl<E: Entity> EntityHandler<E> {
    #[must_use]
    pub fn new(
        repo: Arc<dyn Repository<E>>,
        limits: QueryLimits,
        membership: Arc<Membership>,
    ) -> Self {
        Self {
            repo,
            limits,
            membership,
            hook: None,
        }
    }

    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn CreateHook<E>>) -> Self {
        self.hook = Some(hook);
        self
    }

    fn build_query(&self, request: &ListEntities<E>) -> Result<Query<E>, RequestError> {
        let params = &request.params;
        let pagination = params.validate(&self.limits)?;
        let mut query = Query::new().paginate(pagination);
        if let Some(keyword) = params.keyword() {
            let needle = keyword.to_lowercase();
            query = query.filter(move |entity: &E| entity.matches_keyword(&needle));
        }
        Ok(E::fields().apply(query, params.order_by(), params.direction())?)
    }
}

#[async_trait]
impl<E: Entity> RequestHandler<ListEntities<E>> for EntityHandler<E> {
    async fn handle(
        &self,
        request: ListEntities<E>,
        ctx: &RequestContext,
    ) -> Result<ResultEnvelope<Page<E>>, RequestError> {
        let tenant = self.membership.tenant(ctx).await?;
        let query = self.build_query(&request)?;
        let page = self.repo.query(tenant, query).await.map_err(storage)?;
        tracing::debug!(
            collection = E::COLLECTION,
            total = page.total_count,
            returned = page.items.len(),
            "listed"
        );
        Ok(ResultEnvelope::success_page(page))
    }
}

#[async_trait]
impl<E: Entity> RequestHandler<GetEntity<E>> for EntityHandler<E> {
    async fn handle(
        &self,
        request: GetEntity<E>,
        ctx: &RequestContext,
    ) -> Result<ResultEnvelope<E>, RequestError> {
        let tenant = self.membership.tenant(ctx).await?;
        self.repo
            .find(tenant, request.id)
            .await
            .map_err(storage)?
            .map(ResultEnvelope::success)
            .ok_or_else(|| RequestError::not_found(E::LABEL))
    }
}

#[async_trait]
impl<E: Entity> RequestHandler<CreateEntity<E>> for EntityHandler<E> {
    async fn handle(
        &self,
        request: CreateEntity<E>,
        ctx: &RequestContext,
    ) -> Result<ResultEnvelope<E>, RequestError> {
        let tenant = self.membership.tenant(ctx).await?;
        let entity = E::create(request.input, Stamp::new(tenant))?;
        let stored = self.repo.insert(entity).await.map_err(storage)?;
        tracing::info!(collection = E::COLLECTION, id = %stored.id(), %tenant, "created");

        if let Some(hook) = &self.hook
            && let Err(err) = hook.created(&stored, ctx).await
        {
            let detail = format!("{err:#}");
            tracing::warn!(collection = E::COLLECTION, id = %stored.id(), error = %detail, "post-create step failed");
        }
        Ok(ResultEnvelope::success(stored).with_message(format!("{} created", E::LABEL)))
    }
}

#[async_trait]
impl<E: Entity> RequestHandler<DeleteEntity<E>> for EntityHandler<E> {
    async fn handle(
        &self,
        request: DeleteEntity<E>,
        ctx: &RequestContext,
    ) -> Result<ResultEnvelope<Uuid>, RequestError> {
        let tenant = self.membership.tenant(ctx).await?;
        if !self.repo.delete(tenant, request.id).await.map_err(storage)? {
            return Err(RequestError::not_found(E::LABEL));
        }
        tracing::info!(collection = E::COLLECTION, id = %request.id, %tenant, "deleted");
        Ok(ResultEnvelope::success(request.id).with_message(format!("{} deleted", E::LABEL)))
    }
}
