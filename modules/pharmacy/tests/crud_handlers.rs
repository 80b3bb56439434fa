#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CRUD requests through the full pipeline.

mod common;

use std::time::Duration;

use common::{call, fixture};
use pharmacy::domain::entity::Entity;
use pharmacy::domain::model::{Invoice, NewInvoice, NewWard, Organization, Ward};
use pharmacy::domain::notify::{Channel, Notification, SendNotification};
use pharmacy::domain::requests::{CreateEntity, DeleteEntity, GetEntity, ListEntities};
use rust_decimal::Decimal;
use rxkit::{CancellationToken, RequestError, WorkItem};
use rxkit_errors::ErrorKind;
use rxkit_query::ListParams;
use rxkit_security::CurrentUser;
use uuid::Uuid;

async fn add_ward(f: &common::Fixture, user: &CurrentUser, name: &str, beds: i32) -> Ward {
    let input = NewWard {
        name: name.to_owned(),
        floor: None,
        bed_count: beds,
    };
    f.module
        .mediator()
        .send(call(CreateEntity::<Ward>::new(input), user, Ward::access().write()))
        .await
        .unwrap()
        .into_data()
        .unwrap()
}

async fn next_item(f: &common::Fixture) -> WorkItem {
    tokio::time::timeout(Duration::from_secs(1), f.queue.dequeue(&CancellationToken::new()))
        .await
        .expect("nothing was queued")
        .unwrap()
}

fn list(params: ListParams) -> ListEntities<Ward> {
    ListEntities::new(params)
}

#[tokio::test]
async fn admin_creates_and_reads_back() {
    let f = fixture().await;
    let ward = add_ward(&f, &f.admin, "North", 12).await;
    assert_eq!(ward.organization_id, f.tenant);

    let env = f
        .module
        .mediator()
        .send(call(GetEntity::<Ward>::new(ward.id), &f.admin, Ward::access().read()))
        .await
        .unwrap();
    assert!(env.is_success());
    assert_eq!(env.data().unwrap().name, "North");
}

#[tokio::test]
async fn list_sorts_pages_and_counts() {
    let f = fixture().await;
    for (name, beds) in [("north", 10), ("East", 30), ("south", 20), ("West", 5)] {
        add_ward(&f, &f.admin, name, beds).await;
    }
    let params = ListParams {
        page_number: 1,
        page_size: 3,
        order_by: Some("name".to_owned()),
        sort_by_ascending: true,
        ..ListParams::default()
    };
    let env = f
        .module
        .mediator()
        .send(call(list(params), &f.admin, Ward::access().read()))
        .await
        .unwrap();

    assert_eq!(env.total_count(), Some(4));
    let page = env.into_data().unwrap();
    let names: Vec<_> = page.items.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, ["East", "north", "south"]);
    assert!(page.has_next());
}

#[tokio::test]
async fn default_order_is_newest_first() {
    let f = fixture().await;
    add_ward(&f, &f.admin, "first", 1).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    add_ward(&f, &f.admin, "second", 1).await;

    let env = f
        .module
        .mediator()
        .send(call(list(ListParams::default()), &f.admin, Ward::access().read()))
        .await
        .unwrap();
    let page = env.into_data().unwrap();
    assert_eq!(page.items[0].name, "second");
}

#[tokio::test]
async fn keyword_filters_before_counting() {
    let f = fixture().await;
    for name in ["Cardiology", "Oncology", "Pediatrics"] {
        add_ward(&f, &f.admin, name, 1).await;
    }
    let params = ListParams {
        search_keyword: Some("  OLOGY ".to_owned()),
        ..ListParams::default()
    };
    let env = f
        .module
        .mediator()
        .send(call(list(params), &f.admin, Ward::access().read()))
        .await
        .unwrap();
    assert_eq!(env.total_count(), Some(2));
}

#[tokio::test]
async fn unknown_sort_column_is_invalid_argument() {
    let f = fixture().await;
    let params = ListParams {
        order_by: Some("Password".to_owned()),
        ..ListParams::default()
    };
    let env = f
        .module
        .mediator()
        .send(call(list(params), &f.admin, Ward::access().read()))
        .await
        .unwrap();
    assert!(!env.is_success());
    assert_eq!(env.kind(), Some(ErrorKind::InvalidArgument));
    assert_eq!(env.validation_errors()[0].field, "orderBy");
}

#[tokio::test]
async fn oversized_page_is_invalid_argument() {
    let f = fixture().await;
    let params = ListParams {
        page_size: 5000,
        ..ListParams::default()
    };
    let env = f
        .module
        .mediator()
        .send(call(list(params), &f.admin, Ward::access().read()))
        .await
        .unwrap();
    assert_eq!(env.kind(), Some(ErrorKind::InvalidArgument));
    assert_eq!(env.validation_errors()[0].field, "pageSize");
}

#[tokio::test]
async fn other_tenants_rows_are_not_found() {
    let f = fixture().await;
    let ward = add_ward(&f, &f.admin, "North", 1).await;

    let other_tenant = Uuid::new_v4();
    let outsider = f.user(other_tenant, &["Admin"], true).await;

    let env = f
        .module
        .mediator()
        .send(call(GetEntity::<Ward>::new(ward.id), &outsider, Ward::access().read()))
        .await
        .unwrap();
    assert_eq!(env.kind(), Some(ErrorKind::NotFound));

    let listed = f
        .module
        .mediator()
        .send(call(list(ListParams::default()), &outsider, Ward::access().read()))
        .await
        .unwrap();
    assert_eq!(listed.total_count(), Some(0));

    let deleted = f
        .module
        .mediator()
        .send(call(DeleteEntity::<Ward>::new(ward.id), &outsider, Ward::access().write()))
        .await
        .unwrap();
    assert_eq!(deleted.kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn caller_without_organization_is_forbidden() {
    let f = fixture().await;
    let drifter = CurrentUser::builder().id(f.admin.id().unwrap()).build();
    let result = f
        .module
        .mediator()
        .send(call(list(ListParams::default()), &drifter, Ward::access().read()))
        .await;
    assert!(matches!(result, Err(RequestError::Forbidden(_))));
}

#[tokio::test]
async fn roles_do_not_carry_into_another_organization() {
    let f = fixture().await;
    let ward = add_ward(&f, &f.admin, "North", 1).await;

    // An Admin of some other pharmacy whose token names this tenant.
    let elsewhere = f.user(Uuid::new_v4(), &["Admin"], true).await;
    let intruder = CurrentUser::builder()
        .id(elsewhere.id().unwrap())
        .organization_id(f.tenant)
        .build();
    let mediator = f.module.mediator();

    let input = NewWard {
        name: "Annex".to_owned(),
        ..NewWard::default()
    };
    let result = mediator
        .send(call(CreateEntity::<Ward>::new(input), &intruder, Ward::access().write()))
        .await;
    assert!(matches!(result, Err(RequestError::Forbidden(_))));

    let result = mediator
        .send(call(list(ListParams::default()), &intruder, Ward::access().read()))
        .await;
    assert!(matches!(result, Err(RequestError::Forbidden(_))));

    let result = mediator
        .send(call(DeleteEntity::<Ward>::new(ward.id), &intruder, Ward::access().write()))
        .await;
    assert!(matches!(result, Err(RequestError::Forbidden(_))));

    let still_there = mediator
        .send(call(GetEntity::<Ward>::new(ward.id), &f.admin, Ward::access().read()))
        .await
        .unwrap();
    assert!(still_there.is_success());
}

#[tokio::test]
async fn missing_role_is_forbidden_and_anonymous_unauthenticated() {
    let f = fixture().await;
    let nurse = f.staff(&["Nurse"]).await;
    let input = NewWard {
        name: "East".to_owned(),
        ..NewWard::default()
    };
    let result = f
        .module
        .mediator()
        .send(call(CreateEntity::<Ward>::new(input), &nurse, Ward::access().write()))
        .await;
    assert!(matches!(result, Err(RequestError::Forbidden(_))));

    let result = f
        .module
        .mediator()
        .send(call(
            list(ListParams::default()),
            &CurrentUser::anonymous(),
            Ward::access().read(),
        ))
        .await;
    assert!(matches!(result, Err(RequestError::Unauthenticated)));
}

#[tokio::test]
async fn inactive_user_is_forbidden() {
    let f = fixture().await;
    let retired = f.user(f.tenant, &["Admin"], false).await;
    let result = f
        .module
        .mediator()
        .send(call(list(ListParams::default()), &retired, Ward::access().read()))
        .await;
    assert!(matches!(result, Err(RequestError::Forbidden(_))));
}

#[tokio::test]
async fn invalid_input_reports_fields() {
    let f = fixture().await;
    let input = NewWard {
        name: String::new(),
        floor: None,
        bed_count: -3,
    };
    let env = f
        .module
        .mediator()
        .send(call(CreateEntity::<Ward>::new(input), &f.admin, Ward::access().write()))
        .await
        .unwrap();
    assert!(!env.is_success());
    let fields: Vec<_> = env.validation_errors().iter().map(|v| v.field.as_str()).collect();
    assert_eq!(fields, ["name", "bedCount"]);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let f = fixture().await;
    let ward = add_ward(&f, &f.admin, "North", 1).await;
    let mediator = f.module.mediator();

    let deleted = mediator
        .send(call(DeleteEntity::<Ward>::new(ward.id), &f.admin, Ward::access().write()))
        .await
        .unwrap();
    assert_eq!(deleted.data(), Some(&ward.id));

    let env = mediator
        .send(call(GetEntity::<Ward>::new(ward.id), &f.admin, Ward::access().read()))
        .await
        .unwrap();
    assert_eq!(env.errors(), ["ward not found"]);
}

#[tokio::test]
async fn bootstrap_seeds_tenant_profile() {
    let f = fixture().await;
    let env = f
        .module
        .mediator()
        .send(call(
            GetEntity::<Organization>::new(f.tenant),
            &f.admin,
            Organization::access().read(),
        ))
        .await
        .unwrap();
    assert_eq!(env.data().unwrap().name, "Riverside Pharmacy");

    // Running it again leaves the seed untouched.
    f.module.bootstrap().await.unwrap();
    assert_eq!(f.module.repositories().organizations.len(), 1);
}

fn invoice(number: &str) -> NewInvoice {
    NewInvoice {
        number: number.to_owned(),
        amount: Decimal::new(12_550, 2),
        due_date: None,
        patient_id: None,
    }
}

#[tokio::test]
async fn invoice_needs_billing_policy() {
    let f = fixture().await;
    let billing = f.staff(&["Billing"]).await;
    let env = f
        .module
        .mediator()
        .send(call(
            CreateEntity::<Invoice>::new(invoice("INV-1")),
            &billing,
            Invoice::access().write(),
        ))
        .await
        .unwrap();
    assert!(env.is_success());

    let pharmacist = f.staff(&["Pharmacist"]).await;
    let result = f
        .module
        .mediator()
        .send(call(
            CreateEntity::<Invoice>::new(invoice("INV-2")),
            &pharmacist,
            Invoice::access().write(),
        ))
        .await;
    assert!(matches!(result, Err(RequestError::Forbidden(_))));
}

#[tokio::test]
async fn new_invoice_is_mailed_to_billing_address() {
    let f = fixture().await;
    let env = f
        .module
        .mediator()
        .send(call(
            CreateEntity::<Invoice>::new(invoice("INV-7")),
            &f.admin,
            Invoice::access().write(),
        ))
        .await
        .unwrap();
    assert!(env.is_success(), "{:?}", env.message());

    let item = next_item(&f).await;
    assert!(item.name().starts_with("notify-email-"));
    item.run(CancellationToken::new()).await.unwrap();
}

#[tokio::test]
async fn send_notification_validates_and_queues() {
    let f = fixture().await;
    let pharmacist = f.staff(&["Pharmacist"]).await;
    let mediator = f.module.mediator();

    let fax = Notification {
        channel: Channel::Fax,
        recipient: "+1 555 010 2030".to_owned(),
        subject: "Refill ready".to_owned(),
        body: String::new(),
    };
    let env = mediator
        .send(call(
            SendNotification { notification: fax },
            &pharmacist,
            SendNotification::requirements(),
        ))
        .await
        .unwrap();
    assert!(env.is_success());
    assert!(env.data().unwrap().is_some());
    let item = next_item(&f).await;
    assert!(item.name().starts_with("notify-fax-"));

    let bad = Notification {
        channel: Channel::Email,
        recipient: "front desk".to_owned(),
        subject: "Refill ready".to_owned(),
        body: String::new(),
    };
    let env = mediator
        .send(call(
            SendNotification { notification: bad },
            &pharmacist,
            SendNotification::requirements(),
        ))
        .await
        .unwrap();
    assert_eq!(env.kind(), Some(ErrorKind::InvalidArgument));
}
