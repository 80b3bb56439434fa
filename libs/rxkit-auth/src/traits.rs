use async_trait::async_trait;

use crate::{claims::Claims, errors::AuthError};

/// Validates and parses bearer tokens
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Verify signature and registered claims, then return the payload
    async fn validate_and_parse(&self, token: &str) -> Result<Claims, AuthError>;
}
