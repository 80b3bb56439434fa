//! Capability descriptors attached to a request by its caller.
//!
//! A request carries zero or more [`Requirement`]s. Requirements are ANDed;
//! the roles inside one requirement are ORed; every declared policy must pass.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Caller must hold at least one of these. Empty means no role check.
    pub roles: Vec<String>,
    /// Named policy evaluated by the identity collaborator.
    pub policy: Option<String>,
}

impl Requirement {
    #[must_use]
    pub fn any_role<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            policy: None,
        }
    }

    #[must_use]
    pub fn policy(name: impl Into<String>) -> Self {
        Self {
            roles: Vec::new(),
            policy: Some(name.into()),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, name: impl Into<String>) -> Self {
        self.policy = Some(name.into());
        self
    }

    /// Policy name, ignoring blank entries
    #[must_use]
    pub fn policy_name(&self) -> Option<&str> {
        self.policy.as_deref().filter(|p| !p.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct Requirements(Vec<Requirement>);

impl Requirements {
    /// Public request, no identity needed
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn new(requirements: Vec<Requirement>) -> Self {
        Self(requirements)
    }

    pub fn require(mut self, requirement: Requirement) -> Self {
        self.0.push(requirement);
        self
    }

    pub fn any_role<I, S>(self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require(Requirement::any_role(roles))
    }

    pub fn policy(self, name: impl Into<String>) -> Self {
        self.require(Requirement::policy(name))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Requirement> {
        self.0.iter()
    }

    /// Requirements carrying a non-empty role list
    pub fn role_sets(&self) -> impl Iterator<Item = &[String]> {
        self.0
            .iter()
            .map(|r| r.roles.as_slice())
            .filter(|roles| !roles.is_empty())
    }

    /// Every declared policy name, in declaration order
    pub fn policies(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(Requirement::policy_name)
    }
}

impl<'a> IntoIterator for &'a Requirements {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Requirement> for Requirements {
    fn from_iter<T: IntoIterator<Item = Requirement>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn none_is_empty() {
        assert!(Requirements::none().is_empty());
        assert_eq!(Requirements::none().role_sets().count(), 0);
    }

    #[test]
    fn role_sets_skip_policy_only_requirements() {
        let reqs = Requirements::none()
            .any_role(["Pharmacist", "Administrator"])
            .policy("ManageBilling");

        let sets: Vec<_> = reqs.role_sets().collect();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0], ["Pharmacist", "Administrator"]);
        assert_eq!(reqs.policies().collect::<Vec<_>>(), ["ManageBilling"]);
    }

    #[test]
    fn blank_policy_is_ignored() {
        let reqs = Requirements::none().require(Requirement {
            roles: vec![],
            policy: Some("   ".to_owned()),
        });
        assert!(!reqs.is_empty());
        assert_eq!(reqs.policies().count(), 0);
    }

    #[test]
    fn roles_and_policy_in_one_requirement() {
        let req = Requirement::any_role(["Billing"]).with_policy("ManageBilling");
        assert_eq!(req.policy_name(), Some("ManageBilling"));
        assert_eq!(req.roles, ["Billing"]);
    }
}
