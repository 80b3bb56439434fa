use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::catalog::{self, ErrDef};

/// Error taxonomy shared by the pipeline, the handlers and the HTTP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// No identity present but the request declares requirements.
    Unauthenticated,
    /// Identity present, insufficient role or policy.
    Forbidden,
    /// Unsortable property name, malformed pagination or rejected input.
    InvalidArgument,
    NotFound,
    /// A collaborator (database, identity, mail or fax gateway) failed.
    UpstreamFailure,
    Unexpected,
}

impl ErrorKind {
    #[must_use]
    pub fn def(self) -> &'static ErrDef {
        match self {
            ErrorKind::Unauthenticated => &catalog::UNAUTHENTICATED,
            ErrorKind::Forbidden => &catalog::FORBIDDEN,
            ErrorKind::InvalidArgument => &catalog::INVALID_ARGUMENT,
            ErrorKind::NotFound => &catalog::NOT_FOUND,
            ErrorKind::UpstreamFailure => &catalog::UPSTREAM_FAILURE,
            ErrorKind::Unexpected => &catalog::UNEXPECTED,
        }
    }

    #[must_use]
    pub fn status(self) -> StatusCode {
        StatusCode::from_u16(self.def().status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        self.def().code
    }

    /// Access-denied kinds abort the pipeline before a handler runs.
    #[must_use]
    pub fn is_access_denied(self) -> bool {
        matches!(self, ErrorKind::Unauthenticated | ErrorKind::Forbidden)
    }

    /// Client-input faults, reported at warn level rather than error.
    #[must_use]
    pub fn is_client_fault(self) -> bool {
        self.status().is_client_error()
    }
}
