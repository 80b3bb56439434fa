use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::ExposeSecret;

use crate::{claims::Claims, config::AuthConfig, errors::AuthError, traits::TokenValidator};

/// HS256 validator over a shared secret.
pub struct JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtValidator")
            .field("iss", &self.validation.iss)
            .field("aud", &self.validation.aud)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl JwtValidator {
    /// # Errors
    /// [`AuthError::Misconfigured`] when no secret is configured.
    pub fn from_config(cfg: &AuthConfig) -> Result<Self, AuthError> {
        let secret = cfg
            .secret
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AuthError::Misconfigured("`secret` is required when auth is enabled".to_owned())
            })?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = cfg.leeway_seconds;
        validation.validate_nbf = true;
        if let Some(iss) = &cfg.issuer {
            validation.set_issuer(&[iss]);
        }
        match &cfg.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

#[async_trait]
impl TokenValidator for JwtValidator {
    async fn validate_and_parse(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}
