use axum::Json;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use rxkit::{RequestError, ResultEnvelope};
use serde::Serialize;

/// Render a pipeline outcome.
///
/// Envelopes go out as JSON with a status derived from their failure kind, or
/// `success` when they succeeded. Access denial and cancellation become an
/// RFC 9457 Problem.
#[must_use]
pub fn respond<T: Serialize>(
    result: Result<ResultEnvelope<T>, RequestError>,
    uri: &Uri,
    success: StatusCode,
) -> Response {
    match result {
        Ok(envelope) if envelope.is_success() => (success, Json(envelope)).into_response(),
        Ok(envelope) => (envelope.status(), Json(envelope)).into_response(),
        Err(err) => problem(&err, uri),
    }
}

/// Problem response for an error that never reached an envelope
#[must_use]
pub fn problem(err: &RequestError, uri: &Uri) -> Response {
    let trace_id = tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string());
    if !err.kind().is_access_denied() {
        tracing::warn!(error = %err, path = uri.path(), "request aborted");
    }
    rxkit_errors::finalize(err.to_problem(), uri.path(), trace_id).into_response()
}

/// Failed envelope for input the extractors could not read
#[must_use]
pub fn bad_input(field: &str, detail: String, uri: &Uri) -> Response {
    let err = RequestError::invalid(field, detail);
    tracing::debug!(error = %err, path = uri.path(), "malformed request input");
    respond::<()>(Ok(ResultEnvelope::failure(&err)), uri, StatusCode::OK)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use rxkit_errors::APPLICATION_PROBLEM_JSON;

    #[test]
    fn forbidden_is_a_problem() {
        let uri: Uri = "/api/v1/wards".parse().unwrap();
        let resp = respond::<()>(Err(RequestError::forbidden("nope")), &uri, StatusCode::OK);
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            resp.headers()[axum::http::header::CONTENT_TYPE],
            APPLICATION_PROBLEM_JSON
        );
    }

    #[test]
    fn failed_envelope_keeps_its_status() {
        let uri: Uri = "/api/v1/wards/1".parse().unwrap();
        let env = ResultEnvelope::<u8>::failure(&RequestError::not_found("ward"));
        let resp = respond(Ok(env), &uri, StatusCode::CREATED);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn success_uses_requested_status() {
        let uri: Uri = "/api/v1/wards".parse().unwrap();
        let resp = respond(Ok(ResultEnvelope::success(1)), &uri, StatusCode::CREATED);
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
}
