use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use rxkit_security::{IdentityError, IdentityService};
use uuid::Uuid;

use super::model::User;
use super::repo::Repository;

/// Identity answers backed by the tenant user directory.
///
/// Role checks read the stored [`User`]; a policy passes when the user holds
/// any role configured for it. Unknown users, inactive users and unknown
/// policies are all denied.
pub struct DirectoryIdentityService {
    users: Arc<dyn Repository<User>>,
    policies: BTreeMap<String, Vec<String>>,
}

impl DirectoryIdentityService {
    #[must_use]
    pub fn new(users: Arc<dyn Repository<User>>, policies: BTreeMap<String, Vec<String>>) -> Self {
        Self { users, policies }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn active_user(&self, user_id: Uuid) -> Result<Option<User>, IdentityError> {
        let user = self
            .users
            .get(user_id)
            .await
            .map_err(|e| IdentityError::Unavailable(format!("{e:#}")))?;
        Ok(user.filter(|u| {
            if !u.is_active {
                tracing::debug!(%user_id, "inactive user denied");
            }
            u.is_active
        }))
    }
}

#[async_trait]
impl IdentityService for DirectoryIdentityService {
    async fn is_in_role(&self, user_id: Uuid, role: &str) -> Result<bool, IdentityError> {
        Ok(self
            .active_user(user_id)
            .await?
            .is_some_and(|user| user.has_role(role)))
    }

    async fn authorize(&self, user_id: Uuid, policy: &str) -> Result<bool, IdentityError> {
        let Some(allowed) = self.policies.get(policy) else {
            tracing::debug!(policy, "unknown policy evaluated as denied");
            return Ok(false);
        };
        Ok(self
            .active_user(user_id)
            .await?
            .is_some_and(|user| allowed.iter().any(|role| user.has_role(role))))
    }
}
