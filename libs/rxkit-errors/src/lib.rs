//! Core error types shared by every pharmacy crate
//!
//! Pure data, no HTTP framework required (the `axum` feature adds `IntoResponse`):
//! - RFC 9457 Problem Details (`Problem`)
//! - Error catalog entries (`ErrDef`)
//! - The error taxonomy surfaced to clients (`ErrorKind`)
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod catalog;
pub mod kind;
pub mod problem;

pub use catalog::ErrDef;
pub use kind::ErrorKind;
pub use problem::{APPLICATION_PROBLEM_JSON, Problem, ValidationViolation};

/// Attach the request path and trace id to a Problem before it leaves the process.
#[must_use]
pub fn finalize(mut p: Problem, instance: &str, trace_id: Option<String>) -> Problem {
    p = p.with_instance(instance);
    if let Some(tid) = trace_id {
        p = p.with_trace_id(tid);
    }
    p
}
