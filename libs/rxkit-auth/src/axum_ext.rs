//! Axum middleware and extractor for bearer authentication

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, Method, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use rxkit_security::CurrentUser;

use crate::{config::AuthConfig, errors::AuthError, jwt::JwtValidator, traits::TokenValidator};

/// The authenticated (or anonymous) caller, placed in request extensions by
/// [`authenticate`]
#[derive(Debug, Clone)]
pub struct Caller(pub CurrentUser);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(Caller)
            .ok_or_else(|| {
                AuthError::Internal(
                    "CurrentUser not found - authentication middleware not configured".to_owned(),
                )
            })
    }
}

#[derive(Clone)]
pub struct AuthState {
    validator: Option<Arc<dyn TokenValidator>>,
}

impl AuthState {
    #[must_use]
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self {
            validator: Some(validator),
        }
    }

    /// Every request runs as an anonymous user
    #[must_use]
    pub fn disabled() -> Self {
        Self { validator: None }
    }

    /// # Errors
    /// [`AuthError::Misconfigured`] when auth is enabled without a usable secret.
    pub fn from_config(cfg: &AuthConfig) -> Result<Self, AuthError> {
        if !cfg.enabled {
            tracing::warn!("authentication disabled, all requests run anonymously");
            return Ok(Self::disabled());
        }
        let validator = JwtValidator::from_config(cfg)?;
        Ok(Self::new(Arc::new(validator)))
    }
}

/// Resolve the caller once per request.
///
/// No bearer token (or auth disabled) yields an anonymous [`CurrentUser`] and
/// leaves the decision to the authorization behavior. A token that fails
/// validation is answered with 401 right here.
pub async fn authenticate(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_preflight_request(request.method(), request.headers()) {
        return next.run(request).await;
    }

    let token = extract_bearer_token(request.headers()).map(str::to_owned);
    let user = match (&state.validator, token) {
        (Some(validator), Some(token)) => {
            let resolved = validator
                .validate_and_parse(&token)
                .await
                .and_then(|claims| claims.to_current_user());
            match resolved {
                Ok(user) => user,
                Err(err) => {
                    tracing::debug!(error = %err, "rejecting bearer token");
                    return err.into_response();
                }
            }
        }
        _ => CurrentUser::anonymous(),
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(axum::http::header::ORIGIN)
        && headers.contains_key(axum::http::header::ACCESS_CONTROL_REQUEST_METHOD)
}
