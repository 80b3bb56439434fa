//! Pipeline behaviors as tower layers.
//!
//! [`build`] stacks tracing -> authorization -> handler base. Each layer may
//! short-circuit by answering without calling the inner service.

pub mod authorization;
pub mod trace;

use std::sync::Arc;

use rxkit_security::IdentityServiceRef;
use tower::ServiceBuilder;
use tower::util::BoxService;

use crate::envelope::ResultEnvelope;
use crate::error::RequestError;
use crate::handler::{HandlerService, RequestHandler};
use crate::request::{Call, Request};

pub use authorization::{AuthorizationLayer, AuthorizationService, authorize, require_identity};
pub use trace::{TracingLayer, TracingService};

/// Outcome of one pass through the pipeline
pub type PipelineResult<R> = Result<ResultEnvelope<<R as Request>::Response>, RequestError>;

/// Type-erased pipeline for one request type
pub type Pipeline<R> = BoxService<Call<R>, ResultEnvelope<<R as Request>::Response>, RequestError>;

/// Assemble the standard behavior chain around `handler`.
#[must_use]
pub fn build<R: Request>(
    handler: Arc<dyn RequestHandler<R>>,
    identity: IdentityServiceRef,
) -> Pipeline<R> {
    let svc = ServiceBuilder::new()
        .layer(TracingLayer)
        .layer(AuthorizationLayer::new(identity))
        .service(HandlerService::new(handler));
    BoxService::new(svc)
}
