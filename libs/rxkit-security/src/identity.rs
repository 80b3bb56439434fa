use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

/// Shared handle to the identity collaborator
pub type IdentityServiceRef = Arc<dyn IdentityService>;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity store unavailable: {0}")]
    Unavailable(String),

    #[error("identity lookup failed: {0}")]
    Lookup(String),
}

/// Answers role and policy questions about a user. The authorization gate is a
/// pure consumer of this contract and never looks at how roles are stored.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn is_in_role(&self, user_id: Uuid, role: &str) -> Result<bool, IdentityError>;

    async fn authorize(&self, user_id: Uuid, policy: &str) -> Result<bool, IdentityError>;
}

/// In-memory identity service: explicit role grants plus policy -> roles rules.
///
/// A policy passes when the user holds any role listed for it. Unknown
/// policies never pass.
#[derive(Default)]
pub struct StaticIdentityService {
    grants: RwLock<HashMap<Uuid, HashSet<String>>>,
    policies: RwLock<HashMap<String, Vec<String>>>,
}

impl StaticIdentityService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, user_id: Uuid, role: impl Into<String>) {
        self.grants
            .write()
            .entry(user_id)
            .or_default()
            .insert(role.into());
    }

    pub fn revoke(&self, user_id: Uuid, role: &str) {
        if let Some(roles) = self.grants.write().get_mut(&user_id) {
            roles.remove(role);
        }
    }

    pub fn define_policy<I, S>(&self, name: impl Into<String>, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policies
            .write()
            .insert(name.into(), roles.into_iter().map(Into::into).collect());
    }

    fn holds(&self, user_id: Uuid, role: &str) -> bool {
        self.grants
            .read()
            .get(&user_id)
            .is_some_and(|roles| roles.contains(role))
    }
}

#[async_trait]
impl IdentityService for StaticIdentityService {
    async fn is_in_role(&self, user_id: Uuid, role: &str) -> Result<bool, IdentityError> {
        Ok(self.holds(user_id, role))
    }

    async fn authorize(&self, user_id: Uuid, policy: &str) -> Result<bool, IdentityError> {
        let Some(roles) = self.policies.read().get(policy).cloned() else {
            tracing::debug!(policy, "unknown policy evaluated as denied");
            return Ok(false);
        };
        Ok(roles.iter().any(|role| self.holds(user_id, role)))
    }
}
