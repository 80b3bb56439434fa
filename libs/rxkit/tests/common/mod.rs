#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rxkit::{Call, RequestContext, RequestError, RequestHandler, ResultEnvelope, Request};
use rxkit_security::{CurrentUser, IdentityError, IdentityService};
use uuid::Uuid;

/// Query protected by whatever requirements the test attaches
pub struct ListWards;

impl Request for ListWards {
    type Response = Vec<String>;
}

pub struct ListWardsHandler;

#[async_trait]
impl RequestHandler<ListWards> for ListWardsHandler {
    async fn handle(
        &self,
        _request: ListWards,
        _ctx: &RequestContext,
    ) -> Result<ResultEnvelope<Vec<String>>, RequestError> {
        Ok(ResultEnvelope::success(vec!["North".to_owned()]))
    }
}

pub fn user_with_id() -> (Uuid, CurrentUser) {
    let id = Uuid::new_v4();
    (id, CurrentUser::builder().id(id).user_name("tester").build())
}

pub fn call_as<R: Request>(request: R, user: CurrentUser) -> Call<R> {
    Call::new(request, RequestContext::for_user(user))
}

/// Identity service that counts lookups and can be switched to failing
#[derive(Default)]
pub struct CountingIdentity {
    pub inner: rxkit_security::StaticIdentityService,
    pub role_checks: AtomicUsize,
    pub policy_checks: AtomicUsize,
    pub down: bool,
}

impl CountingIdentity {
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn role_checks(&self) -> usize {
        self.role_checks.load(Ordering::SeqCst)
    }

    pub fn policy_checks(&self) -> usize {
        self.policy_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityService for CountingIdentity {
    async fn is_in_role(&self, user_id: Uuid, role: &str) -> Result<bool, IdentityError> {
        self.role_checks.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(IdentityError::Unavailable("directory offline".to_owned()));
        }
        self.inner.is_in_role(user_id, role).await
    }

    async fn authorize(&self, user_id: Uuid, policy: &str) -> Result<bool, IdentityError> {
        self.policy_checks.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(IdentityError::Unavailable("directory offline".to_owned()));
        }
        self.inner.authorize(user_id, policy).await
    }
}
