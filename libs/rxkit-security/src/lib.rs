#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod context;
pub mod identity;
pub mod requirement;

pub use context::{CurrentUser, CurrentUserBuilder};
pub use identity::{IdentityError, IdentityService, IdentityServiceRef, StaticIdentityService};
pub use requirement::{Requirement, Requirements};
