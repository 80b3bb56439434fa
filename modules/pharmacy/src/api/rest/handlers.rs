//! Handlers turn anonymous callers of protected routes away before reading
//! their input; role and policy checks run inside the pipeline.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::Response;
use rxkit::Call;
use rxkit::pipeline::require_identity;
use rxkit_auth::Caller;
use rxkit_query::ListParams;
use uuid::Uuid;

use super::error::{bad_input, problem, respond};
use super::routes::ApiState;
use crate::domain::entity::Entity;
use crate::domain::notify::{Notification, SendNotification};
use crate::domain::requests::{CreateEntity, DeleteEntity, GetEntity, ListEntities};

pub async fn list<E: Entity>(
    State(state): State<ApiState>,
    Caller(user): Caller,
    uri: Uri,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Response {
    let requirements = E::access().read();
    if let Err(err) = require_identity(&user, &requirements) {
        return problem(&err, &uri);
    }
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return bad_input("query", rejection.body_text(), &uri),
    };
    let call = Call::new(ListEntities::<E>::new(params), state.context(user)).require(requirements);
    respond(state.mediator.send(call).await, &uri, StatusCode::OK)
}

pub async fn get<E: Entity>(
    State(state): State<ApiState>,
    Caller(user): Caller,
    uri: Uri,
    id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let requirements = E::access().read();
    if let Err(err) = require_identity(&user, &requirements) {
        return problem(&err, &uri);
    }
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return bad_input("id", rejection.body_text(), &uri),
    };
    let call = Call::new(GetEntity::<E>::new(id), state.context(user)).require(requirements);
    respond(state.mediator.send(call).await, &uri, StatusCode::OK)
}

pub async fn create<E: Entity>(
    State(state): State<ApiState>,
    Caller(user): Caller,
    uri: Uri,
    body: Result<Json<E::Input>, JsonRejection>,
) -> Response {
    let requirements = E::access().write();
    if let Err(err) = require_identity(&user, &requirements) {
        return problem(&err, &uri);
    }
    let input = match body {
        Ok(Json(input)) => input,
        Err(rejection) => return bad_input("body", rejection.body_text(), &uri),
    };
    let call = Call::new(CreateEntity::<E>::new(input), state.context(user)).require(requirements);
    respond(state.mediator.send(call).await, &uri, StatusCode::CREATED)
}

pub async fn delete<E: Entity>(
    State(state): State<ApiState>,
    Caller(user): Caller,
    uri: Uri,
    id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let requirements = E::access().write();
    if let Err(err) = require_identity(&user, &requirements) {
        return problem(&err, &uri);
    }
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return bad_input("id", rejection.body_text(), &uri),
    };
    let call = Call::new(DeleteEntity::<E>::new(id), state.context(user)).require(requirements);
    respond(state.mediator.send(call).await, &uri, StatusCode::OK)
}

pub async fn send_notification(
    State(state): State<ApiState>,
    Caller(user): Caller,
    uri: Uri,
    body: Result<Json<Notification>, JsonRejection>,
) -> Response {
    let requirements = SendNotification::requirements();
    if let Err(err) = require_identity(&user, &requirements) {
        return problem(&err, &uri);
    }
    let notification = match body {
        Ok(Json(notification)) => notification,
        Err(rejection) => return bad_input("body", rejection.body_text(), &uri),
    };
    let call = Call::new(SendNotification { notification }, state.context(user))
        .require(requirements);
    respond(state.mediator.send(call).await, &uri, StatusCode::ACCEPTED)
}
