use secrecy::SecretString;
use serde::Deserialize;

/// `modules.auth.config` section.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// When off, every request runs as an anonymous user
    pub enabled: bool,
    /// Expected `iss`; unchecked when absent
    pub issuer: Option<String>,
    /// Expected `aud`; unchecked when absent
    pub audience: Option<String>,
    /// HS256 signing secret
    pub secret: Option<SecretString>,
    /// Clock skew tolerated on `exp`/`nbf`
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            issuer: None,
            audience: None,
            secret: None,
            leeway_seconds: 60,
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret = Some(SecretString::from(secret));
        self
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.issuer = Some(issuer.to_owned());
        self
    }

    #[must_use]
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.audience = Some(audience.to_owned());
        self
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_to_enabled_without_secret() {
        let cfg: AuthConfig = serde_json::from_str("{}").unwrap();
        assert!(cfg.enabled);
        assert!(cfg.secret.is_none());
        assert_eq!(cfg.leeway_seconds, 60);
    }

    #[test]
    fn secret_is_redacted_in_debug() {
        let cfg: AuthConfig =
            serde_json::from_str(r#"{"secret":"hunter2","issuer":"rx"}"#).unwrap();
        assert_eq!(cfg.secret.as_ref().unwrap().expose_secret(), "hunter2");
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<AuthConfig>(r#"{"secrets":"x"}"#).is_err());
    }
}
