//! Generic CRUD requests, one set per entity type.

use std::marker::PhantomData;

use rxkit::Request;
use rxkit_query::{ListParams, Page};
use uuid::Uuid;

use super::entity::Entity;

/// Page through the caller's rows, optionally sorted and keyword-filtered
#[derive(Debug)]
pub struct ListEntities<E> {
    pub params: ListParams,
    entity: PhantomData<fn() -> E>,
}

impl<E> ListEntities<E> {
    #[must_use]
    pub fn new(params: ListParams) -> Self {
        Self {
            params,
            entity: PhantomData,
        }
    }
}

impl<E: Entity> Request for ListEntities<E> {
    type Response = Page<E>;
}

#[derive(Debug)]
pub struct GetEntity<E> {
    pub id: Uuid,
    entity: PhantomData<fn() -> E>,
}

impl<E> GetEntity<E> {
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            entity: PhantomData,
        }
    }
}

impl<E: Entity> Request for GetEntity<E> {
    type Response = E;
}

pub struct CreateEntity<E: Entity> {
    pub input: E::Input,
}

impl<E: Entity> CreateEntity<E> {
    #[must_use]
    pub fn new(input: E::Input) -> Self {
        Self { input }
    }
}

impl<E: Entity> Request for CreateEntity<E> {
    type Response = E;
}

/// Remove one of the caller's rows. Responds with the removed id.
#[derive(Debug)]
pub struct DeleteEntity<E> {
    pub id: Uuid,
    entity: PhantomData<fn() -> E>,
}

impl<E> DeleteEntity<E> {
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            entity: PhantomData,
        }
    }
}

impl<E: Entity> Request for DeleteEntity<E> {
    type Response = Uuid;
}
