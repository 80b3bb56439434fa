//! Role and policy gate run once per request, right before the handler.

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use rxkit_security::{CurrentUser, IdentityService, IdentityServiceRef, Requirements};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::error::RequestError;
use crate::request::{Call, Request};

/// Check `user` against `requirements`.
///
/// No requirements: allowed, even anonymously. Otherwise the user must be
/// authenticated, hold at least one role of every role list, and satisfy every
/// policy. Identity lookups are not cached between checks.
///
/// # Errors
/// `Unauthenticated`, `Forbidden`, or `UpstreamFailure` when the identity
/// service itself fails.
pub async fn authorize(
    identity: &dyn IdentityService,
    user: &CurrentUser,
    requirements: &Requirements,
) -> Result<(), RequestError> {
    if requirements.is_empty() {
        return Ok(());
    }
    let Some(user_id) = user.id() else {
        tracing::debug!("anonymous caller on a protected request");
        return Err(RequestError::Unauthenticated);
    };

    for roles in requirements.role_sets() {
        if !in_any_role(identity, user_id, roles).await? {
            tracing::debug!(%user_id, roles = %roles.join(","), "role check failed");
            return Err(RequestError::forbidden(format!(
                "requires one of the roles: {}",
                roles.join(", ")
            )));
        }
    }

    for policy in requirements.policies() {
        if !identity.authorize(user_id, policy).await? {
            tracing::debug!(%user_id, policy, "policy check failed");
            return Err(RequestError::forbidden(format!(
                "policy `{policy}` is not satisfied"
            )));
        }
    }

    Ok(())
}

/// The identity part of [`authorize`] alone, without any directory lookup.
///
/// # Errors
/// `Unauthenticated` when `requirements` is not empty and `user` is anonymous.
pub fn require_identity(
    user: &CurrentUser,
    requirements: &Requirements,
) -> Result<(), RequestError> {
    if requirements.is_empty() || user.is_authenticated() {
        return Ok(());
    }
    tracing::debug!("anonymous caller on a protected request");
    Err(RequestError::Unauthenticated)
}

async fn in_any_role(
    identity: &dyn IdentityService,
    user_id: Uuid,
    roles: &[String],
) -> Result<bool, RequestError> {
    for role in roles {
        if identity.is_in_role(user_id, role).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Layer applying [`authorize`] in front of the inner service
#[derive(Clone)]
pub struct AuthorizationLayer {
    identity: IdentityServiceRef,
}

impl AuthorizationLayer {
    #[must_use]
    pub fn new(identity: IdentityServiceRef) -> Self {
        Self { identity }
    }
}

impl<S> Layer<S> for AuthorizationLayer {
    type Service = AuthorizationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthorizationService {
            inner,
            identity: Arc::clone(&self.identity),
        }
    }
}

#[derive(Clone)]
pub struct AuthorizationService<S> {
    inner: S,
    identity: IdentityServiceRef,
}

impl<S, R> Service<Call<R>> for AuthorizationService<S>
where
    R: Request,
    S: Service<Call<R>, Error = RequestError> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = RequestError;
    type Future = BoxFuture<'static, Result<S::Response, RequestError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, call: Call<R>) -> Self::Future {
        // The readied service goes into the future; a fresh clone stays behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let identity = Arc::clone(&self.identity);
        Box::pin(async move {
            authorize(identity.as_ref(), call.ctx.user(), &call.requirements).await?;
            inner.call(call).await
        })
    }
}
