#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Bearer-token authentication.
//!
//! A [`TokenValidator`] turns a raw JWT into [`Claims`]; the claims map onto the
//! per-request [`CurrentUser`](rxkit_security::CurrentUser). With the
//! `axum-ext` feature, [`authenticate`] does both as an axum middleware.

pub mod claims;
pub mod config;
pub mod errors;
pub mod jwt;
pub mod traits;

#[cfg(feature = "axum-ext")]
pub mod axum_ext;

pub use claims::Claims;
pub use config::AuthConfig;
pub use errors::AuthError;
pub use jwt::JwtValidator;
pub use traits::TokenValidator;

#[cfg(feature = "axum-ext")]
pub use axum_ext::{AuthState, Caller, authenticate};
