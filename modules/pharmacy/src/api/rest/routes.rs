use axum::Router;
use axum::routing::{get, post};
use rxkit::{CancellationToken, Mediator, RequestContext};
use rxkit_security::CurrentUser;

use super::handlers;
use crate::domain::entity::Entity;
use crate::domain::model::{Document, Invoice, Organization, Patient, User, Ward};

/// Shared state of the REST handlers
#[derive(Clone)]
pub struct ApiState {
    pub mediator: Mediator,
    /// Cancelled when the host shuts down; every request gets a child of it.
    pub shutdown: CancellationToken,
}

impl ApiState {
    pub(super) fn context(&self, user: CurrentUser) -> RequestContext {
        RequestContext::new(user, self.shutdown.child_token())
    }
}

/// Every pharmacy route under `/api/v1`. The caller must layer the
/// authentication middleware on top.
#[must_use]
pub fn router(state: ApiState) -> Router {
    Router::new()
        .merge(collection::<Organization>())
        .merge(collection::<Ward>())
        .merge(collection::<Patient>())
        .merge(collection::<User>())
        .merge(collection::<Document>())
        .merge(collection::<Invoice>())
        .route("/api/v1/notifications", post(handlers::send_notification))
        .with_state(state)
}

fn collection<E: Entity>() -> Router<ApiState> {
    let path = format!("/api/v1/{}", E::COLLECTION);
    Router::new()
        .route(&path, get(handlers::list::<E>).post(handlers::create::<E>))
        .route(
            &format!("{path}/{{id}}"),
            get(handlers::get::<E>).delete(handlers::delete::<E>),
        )
}
