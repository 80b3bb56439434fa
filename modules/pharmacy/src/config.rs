use std::collections::BTreeMap;

use rxkit_query::QueryLimits;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::access::{policies, roles};

/// Configuration for the pharmacy module, read from `modules.pharmacy.config`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PharmacyConfig {
    /// Caps on list parameters
    pub query: QueryLimits,
    /// Policy name -> roles that satisfy it
    pub policies: BTreeMap<String, Vec<String>>,
    pub notifications: NotificationsConfig,
    /// Tenant and administrator created on startup when set
    pub bootstrap: Option<BootstrapConfig>,
}

impl Default for PharmacyConfig {
    fn default() -> Self {
        Self {
            query: QueryLimits::default(),
            policies: default_policies(),
            notifications: NotificationsConfig::default(),
            bootstrap: None,
        }
    }
}

fn default_policies() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([(
        policies::MANAGE_BILLING.to_owned(),
        vec![roles::ADMIN.to_owned(), roles::BILLING.to_owned()],
    )])
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationsConfig {
    /// When false, notification requests are accepted but nothing is queued
    pub enabled: bool,
    /// Sender address stamped on outgoing email and fax cover sheets
    pub from_address: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            from_address: "no-reply@pharmacy.local".to_owned(),
        }
    }
}

/// Seed data for an empty deployment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapConfig {
    pub organization_id: Uuid,
    pub organization_name: String,
    #[serde(default)]
    pub billing_email: Option<String>,
    /// Must match the `sub` claim of the administrator's tokens
    pub admin_id: Uuid,
    pub admin_user_name: String,
    pub admin_email: String,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_define_manage_billing() {
        let cfg = PharmacyConfig::default();
        assert_eq!(
            cfg.policies.get(policies::MANAGE_BILLING),
            Some(&vec!["Admin".to_owned(), "Billing".to_owned()])
        );
        assert!(cfg.notifications.enabled);
        assert!(cfg.bootstrap.is_none());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: PharmacyConfig = serde_json::from_value(json!({
            "query": { "max_page_size": 100 },
            "notifications": { "enabled": false }
        }))
        .unwrap();
        assert_eq!(cfg.query.max_page_size, 100);
        assert_eq!(cfg.query.max_search_length, 200);
        assert!(!cfg.notifications.enabled);
        assert_eq!(cfg.notifications.from_address, "no-reply@pharmacy.local");
        assert!(cfg.policies.contains_key("ManageBilling"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = serde_json::from_value::<PharmacyConfig>(json!({ "qurey": {} })).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn bootstrap_section_parses() {
        let org = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let cfg: PharmacyConfig = serde_json::from_value(json!({
            "bootstrap": {
                "organization_id": org,
                "organization_name": "Riverside Pharmacy",
                "admin_id": admin,
                "admin_user_name": "admin",
                "admin_email": "admin@riverside.example"
            }
        }))
        .unwrap();
        let boot = cfg.bootstrap.unwrap();
        assert_eq!(boot.organization_id, org);
        assert_eq!(boot.billing_email, None);
    }
}
