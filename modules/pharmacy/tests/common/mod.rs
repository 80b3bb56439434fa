#![allow(dead_code)]

use std::sync::Arc;

use pharmacy::PharmacyConfig;
use pharmacy::PharmacyModule;
use pharmacy::config::BootstrapConfig;
use pharmacy::domain::entity::{Entity, Stamp};
use pharmacy::domain::model::{NewUser, User};
use pharmacy::domain::notify::LoggingSender;
use pharmacy::domain::repo::Repository;
use rxkit::{Call, Request, RequestContext, TaskQueue};
use rxkit_security::{CurrentUser, Requirements};
use uuid::Uuid;

pub struct Fixture {
    pub module: PharmacyModule,
    pub queue: TaskQueue,
    pub tenant: Uuid,
    pub admin: CurrentUser,
}

pub async fn fixture() -> Fixture {
    fixture_with(PharmacyConfig::default()).await
}

pub async fn fixture_with(mut config: PharmacyConfig) -> Fixture {
    let tenant = Uuid::new_v4();
    let admin_id = Uuid::new_v4();
    config.bootstrap = Some(BootstrapConfig {
        organization_id: tenant,
        organization_name: "Riverside Pharmacy".to_owned(),
        billing_email: Some("billing@riverside.example".to_owned()),
        admin_id,
        admin_user_name: "admin".to_owned(),
        admin_email: "admin@riverside.example".to_owned(),
    });
    let queue = TaskQueue::new();
    let module = PharmacyModule::new(
        config,
        queue.clone(),
        Arc::new(LoggingSender::new("no-reply@riverside.example")),
    );
    module.bootstrap().await.unwrap();

    let admin = CurrentUser::builder()
        .id(admin_id)
        .organization_id(tenant)
        .user_name("admin")
        .role("Admin")
        .build();
    Fixture {
        module,
        queue,
        tenant,
        admin,
    }
}

impl Fixture {
    /// Store a directory user and return the matching caller identity
    pub async fn user(&self, tenant: Uuid, roles: &[&str], active: bool) -> CurrentUser {
        let id = Uuid::new_v4();
        let user = User::create(
            NewUser {
                id: Some(id),
                user_name: format!("user-{id}"),
                first_name: None,
                last_name: None,
                email: format!("{id}@riverside.example"),
                user_type_id: 1,
                roles: roles.iter().map(|r| (*r).to_owned()).collect(),
                is_active: active,
            },
            Stamp::new(tenant),
        )
        .unwrap();
        self.module.repositories().users.insert(user).await.unwrap();
        CurrentUser::builder().id(id).organization_id(tenant).build()
    }

    pub async fn staff(&self, roles: &[&str]) -> CurrentUser {
        self.user(self.tenant, roles, true).await
    }
}

pub fn call<R: Request>(request: R, user: &CurrentUser, requirements: Requirements) -> Call<R> {
    Call::new(request, RequestContext::for_user(user.clone())).require(requirements)
}
