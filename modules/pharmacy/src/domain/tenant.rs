use std::sync::Arc;

use rxkit::{RequestContext, RequestError};
use uuid::Uuid;

use super::model::User;
use super::repo::Repository;

/// Resolves the organization a call acts in.
///
/// The `organizationId` on the caller comes from the token; it only counts
/// when the tenant's directory holds a user with the caller's id. Role checks
/// read that same directory, so roles granted in one organization never carry
/// over into another.
pub struct Membership {
    users: Arc<dyn Repository<User>>,
}

impl Membership {
    #[must_use]
    pub fn new(users: Arc<dyn Repository<User>>) -> Self {
        Self { users }
    }

    /// The organization every query of this call is scoped to.
    ///
    /// # Errors
    /// `Forbidden` when the caller is not bound to an organization or is not
    /// listed in its directory, `UpstreamFailure` when the directory cannot be
    /// read.
    pub async fn tenant(&self, ctx: &RequestContext) -> Result<Uuid, RequestError> {
        let user = ctx.user();
        let tenant = user
            .organization_id()
            .ok_or_else(|| RequestError::forbidden("caller is not bound to an organization"))?;
        let user_id = user.id().ok_or(RequestError::Unauthenticated)?;

        if self.users.find(tenant, user_id).await.map_err(storage)?.is_none() {
            tracing::warn!(%user_id, %tenant, "caller is not in the organization directory");
            return Err(RequestError::forbidden("caller is not a member of this organization"));
        }
        Ok(tenant)
    }
}

/// Storage faults surface as upstream failures
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn storage(err: anyhow::Error) -> RequestError {
    RequestError::upstream(format!("storage: {err:#}"))
}
