#![allow(clippy::unwrap_used, clippy::expect_used)]

//! HTTP surface, driven in-process through `tower::ServiceExt::oneshot`.

mod common;

use axum::Extension;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use common::{Fixture, fixture};
use rxkit::CancellationToken;
use rxkit_errors::APPLICATION_PROBLEM_JSON;
use rxkit_security::CurrentUser;
use serde_json::{Value, json};
use tower::ServiceExt;

/// The router as the server mounts it, with `user` standing in for the
/// authentication middleware.
fn app(f: &Fixture, user: &CurrentUser) -> Router {
    app_until(f, user, CancellationToken::new())
}

fn app_until(f: &Fixture, user: &CurrentUser, shutdown: CancellationToken) -> Router {
    f.module.router(shutdown).layer(Extension(user.clone()))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_owned());
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, content_type, json)
}

#[tokio::test]
async fn create_get_list_delete_round() {
    let f = fixture().await;
    let admin = &f.admin;

    let (status, _, body) = send(
        app(&f, admin),
        Method::POST,
        "/api/v1/wards",
        Some(json!({ "name": "North", "bedCount": 14 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["isSuccess"], true);
    assert_eq!(body["message"], "ward created");
    let id = body["data"]["id"].as_str().unwrap().to_owned();

    send(
        app(&f, admin),
        Method::POST,
        "/api/v1/wards",
        Some(json!({ "name": "East", "floor": 2 })),
    )
    .await;

    let (status, _, body) = send(app(&f, admin), Method::GET, &format!("/api/v1/wards/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bedCount"], 14);

    let (status, _, body) = send(
        app(&f, admin),
        Method::GET,
        "/api/v1/wards?orderBy=Name&sortByAscending=true&pageSize=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 2);
    assert_eq!(body["data"]["items"][0]["name"], "East");

    let (status, _, body) = send(app(&f, admin), Method::DELETE, &format!("/api/v1/wards/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], id.as_str());

    let (status, _, body) = send(app(&f, admin), Method::GET, &format!("/api/v1/wards/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["isSuccess"], false);
    assert_eq!(body["errors"][0], "ward not found");
}

#[tokio::test]
async fn anonymous_caller_gets_401_problem() {
    let f = fixture().await;
    let (status, content_type, body) =
        send(app(&f, &CurrentUser::anonymous()), Method::GET, "/api/v1/patients", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(content_type.as_deref(), Some(APPLICATION_PROBLEM_JSON));
    assert_eq!(body["status"], 401);
    assert_eq!(body["instance"], "/api/v1/patients");
}

#[tokio::test]
async fn anonymous_caller_is_turned_away_before_input_is_read() {
    let f = fixture().await;
    let (status, content_type, body) = send(
        app(&f, &CurrentUser::anonymous()),
        Method::POST,
        "/api/v1/wards",
        Some(json!({ "wing": "B" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(content_type.as_deref(), Some(APPLICATION_PROBLEM_JSON));

    let (status, _, _) = send(
        app(&f, &CurrentUser::anonymous()),
        Method::GET,
        "/api/v1/wards/not-a-uuid",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn shutdown_cancels_requests() {
    let f = fixture().await;
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let (status, content_type, _) = send(
        app_until(&f, &f.admin, shutdown),
        Method::POST,
        "/api/v1/wards",
        Some(json!({ "name": "North", "bedCount": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type.as_deref(), Some(APPLICATION_PROBLEM_JSON));

    let (status, _, body) = send(app(&f, &f.admin), Method::GET, "/api/v1/wards", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 0);
}

#[tokio::test]
async fn wrong_role_gets_403_problem() {
    let f = fixture().await;
    let billing = f.staff(&["Billing"]).await;
    let (status, content_type, body) = send(app(&f, &billing), Method::GET, "/api/v1/wards", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(content_type.as_deref(), Some(APPLICATION_PROBLEM_JSON));
    assert_eq!(body["status"], 403);
}

#[tokio::test]
async fn validation_failure_is_422_envelope() {
    let f = fixture().await;
    let (status, content_type, body) = send(
        app(&f, &f.admin),
        Method::POST,
        "/api/v1/organizations",
        Some(json!({ "name": " ", "billingEmail": "accounts" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let fields: Vec<_> = body["validationErrors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["name", "billingEmail"]);
}

#[tokio::test]
async fn unreadable_input_is_invalid_argument() {
    let f = fixture().await;

    let (status, _, body) = send(app(&f, &f.admin), Method::GET, "/api/v1/wards/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["validationErrors"][0]["field"], "id");

    let (status, _, body) = send(
        app(&f, &f.admin),
        Method::POST,
        "/api/v1/wards",
        Some(json!({ "name": "North", "wing": "B" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["validationErrors"][0]["field"], "body");

    let (status, _, body) = send(app(&f, &f.admin), Method::GET, "/api/v1/wards?orderBy=Secret", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["validationErrors"][0]["field"], "orderBy");
}

#[tokio::test]
async fn notification_is_accepted() {
    let f = fixture().await;
    let (status, _, body) = send(
        app(&f, &f.admin),
        Method::POST,
        "/api/v1/notifications",
        Some(json!({ "channel": "email", "recipient": "ward.north@riverside.example", "subject": "Stock low" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["message"], "notification queued");
    assert!(body["data"].is_string());
}

#[tokio::test]
async fn users_are_admin_only() {
    let f = fixture().await;
    let pharmacist = f.staff(&["Pharmacist"]).await;
    let (status, _, _) = send(app(&f, &pharmacist), Method::GET, "/api/v1/users", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = send(app(&f, &f.admin), Method::GET, "/api/v1/users?orderBy=UserName", None).await;
    assert_eq!(status, StatusCode::OK);
    // Seeded administrator plus the pharmacist
    assert_eq!(body["totalCount"], 2);
}
