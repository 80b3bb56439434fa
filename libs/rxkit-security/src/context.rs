use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity snapshot of the caller, resolved once per inbound request from its
/// authentication token and passed explicitly down every call chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    id: Option<Uuid>,
    first_name: Option<String>,
    last_name: Option<String>,
    user_name: Option<String>,
    user_type_id: Option<i32>,
    organization_id: Option<Uuid>,
    roles: Vec<String>,
}

impl CurrentUser {
    #[must_use]
    pub fn builder() -> CurrentUserBuilder {
        CurrentUserBuilder::default()
    }

    /// Caller without a resolved identity
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }

    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    #[must_use]
    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    #[must_use]
    pub fn user_type_id(&self) -> Option<i32> {
        self.user_type_id
    }

    /// Tenant the caller belongs to
    #[must_use]
    pub fn organization_id(&self) -> Option<Uuid> {
        self.organization_id
    }

    /// Roles carried by the token. Authorization decisions go through
    /// `IdentityService`, these are informational.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// "First Last", falling back to the user name.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        match (self.first_name(), self.last_name()) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(one), None) | (None, Some(one)) => Some(one.to_owned()),
            (None, None) => self.user_name.clone(),
        }
    }
}

#[derive(Default)]
pub struct CurrentUserBuilder {
    id: Option<Uuid>,
    first_name: Option<String>,
    last_name: Option<String>,
    user_name: Option<String>,
    user_type_id: Option<i32>,
    organization_id: Option<Uuid>,
    roles: Vec<String>,
}

impl CurrentUserBuilder {
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn first_name(mut self, first_name: &str) -> Self {
        self.first_name = Some(first_name.to_owned());
        self
    }

    #[must_use]
    pub fn last_name(mut self, last_name: &str) -> Self {
        self.last_name = Some(last_name.to_owned());
        self
    }

    #[must_use]
    pub fn user_name(mut self, user_name: &str) -> Self {
        self.user_name = Some(user_name.to_owned());
        self
    }

    #[must_use]
    pub fn user_type_id(mut self, user_type_id: i32) -> Self {
        self.user_type_id = Some(user_type_id);
        self
    }

    #[must_use]
    pub fn organization_id(mut self, organization_id: Uuid) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    #[must_use]
    pub fn role(mut self, role: &str) -> Self {
        self.roles.push(role.to_owned());
        self
    }

    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn build(self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            user_name: self.user_name,
            user_type_id: self.user_type_id,
            organization_id: self.organization_id,
            roles: self.roles,
        }
    }
}
