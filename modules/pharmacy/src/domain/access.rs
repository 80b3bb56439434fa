//! Role and policy names, and the read/write requirements each collection
//! declares.

use rxkit_security::{Requirement, Requirements};

pub mod roles {
    pub const ADMIN: &str = "Admin";
    pub const PHARMACIST: &str = "Pharmacist";
    pub const TECHNICIAN: &str = "Technician";
    pub const NURSE: &str = "Nurse";
    pub const BILLING: &str = "Billing";

    /// Every role the directory knows about
    pub const ALL: [&str; 5] = [ADMIN, PHARMACIST, TECHNICIAN, NURSE, BILLING];
}

pub mod policies {
    pub const MANAGE_BILLING: &str = "ManageBilling";
}

/// What a caller must hold to read or change one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Access {
    read: Requirement,
    write: Requirement,
}

impl Access {
    #[must_use]
    pub fn new(read: &[&str], write: &[&str]) -> Self {
        Self {
            read: Requirement::any_role(read.iter().copied()),
            write: Requirement::any_role(write.iter().copied()),
        }
    }

    /// Add a policy every write must satisfy as well
    #[must_use]
    pub fn with_write_policy(mut self, policy: &str) -> Self {
        self.write = self.write.with_policy(policy);
        self
    }

    pub fn read(&self) -> Requirements {
        Requirements::none().require(self.read.clone())
    }

    pub fn write(&self) -> Requirements {
        Requirements::none().require(self.write.clone())
    }
}
