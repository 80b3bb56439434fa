use http::StatusCode;
use rxkit_errors::{ErrorKind, ValidationViolation};
use rxkit_query::Page;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// Uniform success/failure wrapper returned by every handler.
///
/// A successful envelope never carries errors. The failure kind stays out of
/// the serialized body and only drives the HTTP status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use]
pub struct ResultEnvelope<T> {
    is_success: bool,
    data: Option<T>,
    errors: Vec<String>,
    validation_errors: Vec<ValidationViolation>,
    total_count: Option<u64>,
    message: Option<String>,
    #[serde(skip)]
    kind: Option<ErrorKind>,
}

impl<T> ResultEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            is_success: true,
            data: Some(data),
            errors: Vec::new(),
            validation_errors: Vec::new(),
            total_count: None,
            message: None,
            kind: None,
        }
    }

    pub fn failure(err: &RequestError) -> Self {
        Self {
            is_success: false,
            data: None,
            errors: vec![err.to_string()],
            validation_errors: err.violations().to_vec(),
            total_count: None,
            message: None,
            kind: Some(err.kind()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_total_count(mut self, total_count: u64) -> Self {
        self.total_count = Some(total_count);
        self
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.is_success
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[must_use]
    pub fn validation_errors(&self) -> &[ValidationViolation] {
        &self.validation_errors
    }

    #[must_use]
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Failure kind, `None` on success
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    /// HTTP status for this outcome
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.kind.map_or(StatusCode::OK, ErrorKind::status)
    }

    pub fn map<U, F>(self, f: F) -> ResultEnvelope<U>
    where
        F: FnOnce(T) -> U,
    {
        ResultEnvelope {
            is_success: self.is_success,
            data: self.data.map(f),
            errors: self.errors,
            validation_errors: self.validation_errors,
            total_count: self.total_count,
            message: self.message,
            kind: self.kind,
        }
    }
}

impl<T> ResultEnvelope<Page<T>> {
    /// Success carrying one page, with `totalCount` taken from the page
    pub fn success_page(page: Page<T>) -> Self {
        let total = page.total_count;
        Self::success(page).with_total_count(total)
    }
}

impl<T> From<RequestError> for ResultEnvelope<T> {
    fn from(err: RequestError) -> Self {
        Self::failure(&err)
    }
}
