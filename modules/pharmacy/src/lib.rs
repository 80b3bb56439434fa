#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Pharmacy module
//!
//! Multi-tenant CRUD over organizations, wards, patients, users, documents and
//! invoices, plus email/fax notifications delivered by the background worker.
//! Every operation goes through the `rxkit` request pipeline.

pub mod module;
pub use module::{PharmacyModule, Repositories};

pub mod config;
pub use config::PharmacyConfig;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
