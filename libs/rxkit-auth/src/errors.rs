use rxkit_errors::{Problem, catalog};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    #[error("invalid claim `{field}`: {reason}")]
    InvalidClaim { field: &'static str, reason: String },

    #[error("authentication misconfigured: {0}")]
    Misconfigured(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn to_problem(&self) -> Problem {
        match self {
            AuthError::InvalidToken(_)
            | AuthError::TokenExpired
            | AuthError::InvalidClaim { .. } => {
                catalog::UNAUTHENTICATED.as_problem(self.to_string())
            }
            AuthError::Misconfigured(_) | AuthError::Internal(_) => {
                catalog::UNEXPECTED.as_problem("authentication is unavailable")
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidIssuer => AuthError::InvalidClaim {
                field: "iss",
                reason: "unexpected issuer".to_owned(),
            },
            ErrorKind::InvalidAudience => AuthError::InvalidClaim {
                field: "aud",
                reason: "unexpected audience".to_owned(),
            },
            ErrorKind::MissingRequiredClaim(claim) => {
                AuthError::InvalidToken(format!("missing `{claim}` claim"))
            }
            _ => AuthError::InvalidToken(err.to_string()),
        }
    }
}

#[cfg(feature = "axum-ext")]
impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        if matches!(self, AuthError::Misconfigured(_) | AuthError::Internal(_)) {
            tracing::error!(error = %self, "authentication failure");
        }
        self.to_problem().into_response()
    }
}
