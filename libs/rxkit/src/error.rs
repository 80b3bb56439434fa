use rxkit_errors::{ErrorKind, Problem, ValidationViolation};
use rxkit_security::IdentityError;

/// Failure of a request anywhere in the pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("{message}")]
    InvalidArgument {
        message: String,
        violations: Vec<ValidationViolation>,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),

    /// Cooperative cancellation. Never folded into a result envelope.
    #[error("request cancelled")]
    Cancelled,
}

impl RequestError {
    #[must_use]
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    /// One rejected field
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let violation = ValidationViolation::new(field, message);
        Self::InvalidArgument {
            message: violation.message.clone(),
            violations: vec![violation],
        }
    }

    /// Several rejected fields at once
    #[must_use]
    pub fn validation(violations: Vec<ValidationViolation>) -> Self {
        Self::InvalidArgument {
            message: "one or more fields are invalid".to_owned(),
            violations,
        }
    }

    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    #[must_use]
    pub fn upstream(detail: impl Into<String>) -> Self {
        Self::UpstreamFailure(detail.into())
    }

    #[must_use]
    pub fn unexpected(detail: impl Into<String>) -> Self {
        Self::Unexpected(detail.into())
    }

    /// Taxonomy kind; cancellation reports as `Unexpected`
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::UpstreamFailure(_) => ErrorKind::UpstreamFailure,
            Self::Unexpected(_) | Self::Cancelled => ErrorKind::Unexpected,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Errors that leave the pipeline as `Err` instead of a failed envelope
    #[must_use]
    pub fn aborts_pipeline(&self) -> bool {
        self.is_cancelled() || self.kind().is_access_denied()
    }

    #[must_use]
    pub fn violations(&self) -> &[ValidationViolation] {
        match self {
            Self::InvalidArgument { violations, .. } => violations,
            _ => &[],
        }
    }

    pub fn to_problem(&self) -> Problem {
        let def = self.kind().def();
        match self {
            Self::InvalidArgument { violations, .. } => {
                def.as_problem(self.to_string()).with_errors(violations.clone())
            }
            Self::Unexpected(_) | Self::Cancelled => def.as_problem("an unexpected error occurred"),
            _ => def.as_problem(self.to_string()),
        }
    }
}

impl From<rxkit_query::Error> for RequestError {
    fn from(err: rxkit_query::Error) -> Self {
        Self::invalid(err.field(), err.to_string())
    }
}

impl From<IdentityError> for RequestError {
    fn from(err: IdentityError) -> Self {
        Self::UpstreamFailure(err.to_string())
    }
}

impl From<anyhow::Error> for RequestError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unexpected(format!("{err:#}"))
    }
}
