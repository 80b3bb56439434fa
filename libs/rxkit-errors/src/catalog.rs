//! Static error catalog entries

use crate::problem::Problem;
use http::StatusCode;

/// Static error definition from the catalog
#[derive(Debug, Clone, Copy)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    #[inline]
    pub fn as_problem(&self, detail: impl Into<String>) -> Problem {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Problem::new(status, self.title, detail.into())
            .with_code(self.code)
            .with_type(self.type_url)
    }
}

pub const UNAUTHENTICATED: ErrDef = ErrDef {
    status: 401,
    title: "Unauthenticated",
    code: "UNAUTHENTICATED",
    type_url: "https://errors.pharmacy.local/unauthenticated",
};

pub const FORBIDDEN: ErrDef = ErrDef {
    status: 403,
    title: "Forbidden",
    code: "FORBIDDEN",
    type_url: "https://errors.pharmacy.local/forbidden",
};

pub const INVALID_ARGUMENT: ErrDef = ErrDef {
    status: 422,
    title: "Invalid Argument",
    code: "INVALID_ARGUMENT",
    type_url: "https://errors.pharmacy.local/invalid-argument",
};

pub const NOT_FOUND: ErrDef = ErrDef {
    status: 404,
    title: "Not Found",
    code: "NOT_FOUND",
    type_url: "https://errors.pharmacy.local/not-found",
};

pub const UPSTREAM_FAILURE: ErrDef = ErrDef {
    status: 502,
    title: "Upstream Failure",
    code: "UPSTREAM_FAILURE",
    type_url: "https://errors.pharmacy.local/upstream-failure",
};

pub const UNEXPECTED: ErrDef = ErrDef {
    status: 500,
    title: "Unexpected Error",
    code: "UNEXPECTED",
    type_url: "https://errors.pharmacy.local/unexpected",
};
