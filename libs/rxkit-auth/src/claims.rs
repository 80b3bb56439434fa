use rxkit_security::CurrentUser;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AuthError;

/// Payload of an access token issued for the pharmacy API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, a UUID string
    pub sub: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Single audience or array of audiences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type_id: Option<i32>,

    /// Tenant the user belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,

    #[serde(default)]
    pub roles: Vec<String>,
}

impl Claims {
    /// Build the request-scoped user snapshot from validated claims.
    ///
    /// # Errors
    /// [`AuthError::InvalidClaim`] when `sub` or `org_id` is not a UUID.
    pub fn to_current_user(&self) -> Result<CurrentUser, AuthError> {
        let id = parse_uuid("sub", &self.sub)?;
        let mut builder = CurrentUser::builder().id(id).roles(&self.roles);

        if let Some(org) = self.org_id.as_deref() {
            builder = builder.organization_id(parse_uuid("org_id", org)?);
        }
        if let Some(first) = self.given_name.as_deref() {
            builder = builder.first_name(first);
        }
        if let Some(last) = self.family_name.as_deref() {
            builder = builder.last_name(last);
        }
        if let Some(user_name) = self.preferred_username.as_deref() {
            builder = builder.user_name(user_name);
        }
        if let Some(type_id) = self.user_type_id {
            builder = builder.user_type_id(type_id);
        }
        Ok(builder.build())
    }
}

fn parse_uuid(field: &'static str, raw: &str) -> Result<Uuid, AuthError> {
    Uuid::parse_str(raw).map_err(|e| AuthError::InvalidClaim {
        field,
        reason: e.to_string(),
    })
}
