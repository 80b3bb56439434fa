use std::sync::Arc;

use rxkit_security::IdentityServiceRef;
use tower::ServiceExt;

use crate::envelope::ResultEnvelope;
use crate::error::RequestError;
use crate::handler::RequestHandler;
use crate::pipeline::{self, PipelineResult};
use crate::registry::HandlerRegistry;
use crate::request::{Call, Request};

/// Dispatches calls to their registered handler through the pipeline.
#[derive(Clone)]
pub struct Mediator {
    registry: Arc<HandlerRegistry>,
    identity: IdentityServiceRef,
}

impl Mediator {
    #[must_use]
    pub fn new(registry: Arc<HandlerRegistry>, identity: IdentityServiceRef) -> Self {
        Self { registry, identity }
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn register<R: Request>(&self, handler: Arc<dyn RequestHandler<R>>) {
        self.registry.register(handler);
    }

    /// Run `call` through tracing, authorization and the handler base.
    ///
    /// # Errors
    /// Only access denial (`Unauthenticated`, `Forbidden`) and `Cancelled`.
    /// Every other failure comes back as a failed envelope.
    pub async fn send<R: Request>(&self, call: Call<R>) -> PipelineResult<R> {
        let handler = match self.registry.resolve::<R>() {
            Ok(handler) => handler,
            Err(err) => {
                tracing::error!(request = R::name(), error = %err, "request has no handler");
                return Ok(ResultEnvelope::failure(&RequestError::unexpected(err.to_string())));
            }
        };

        let result = pipeline::build(handler, Arc::clone(&self.identity))
            .oneshot(call)
            .await;

        match result {
            Err(err) if !err.aborts_pipeline() => {
                tracing::warn!(request = R::name(), error = %err, "request failed before its handler");
                Ok(ResultEnvelope::failure(&err))
            }
            other => other,
        }
    }
}
