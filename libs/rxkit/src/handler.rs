//! Handler contract and the handler base that wraps every handler.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use tower::Service;

use crate::envelope::ResultEnvelope;
use crate::error::RequestError;
use crate::request::{Call, Request, RequestContext};

/// Core logic for one request type.
///
/// Return `Ok` with a (possibly failed) envelope for outcomes the handler
/// decides on. Any `Err`, or a panic, is turned into a failed envelope by
/// [`HandlerService`] unless it is an access denial or a cancellation.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(
        &self,
        request: R,
        ctx: &RequestContext,
    ) -> Result<ResultEnvelope<R::Response>, RequestError>;
}

/// Terminal service of the pipeline.
pub struct HandlerService<R: Request> {
    handler: Arc<dyn RequestHandler<R>>,
}

impl<R: Request> Clone for HandlerService<R> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<R: Request> HandlerService<R> {
    #[must_use]
    pub fn new(handler: Arc<dyn RequestHandler<R>>) -> Self {
        Self { handler }
    }
}

impl<R: Request> Service<Call<R>> for HandlerService<R> {
    type Response = ResultEnvelope<R::Response>;
    type Error = RequestError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, call: Call<R>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        Box::pin(async move {
            let Call { request, ctx, .. } = call;
            if ctx.is_cancelled() {
                return Err(RequestError::Cancelled);
            }

            let work = AssertUnwindSafe(handler.handle(request, &ctx)).catch_unwind();
            let outcome = tokio::select! {
                biased;
                () = ctx.cancellation().cancelled() => return Err(RequestError::Cancelled),
                outcome = work => outcome,
            };

            match outcome {
                Ok(Ok(envelope)) => Ok(envelope),
                Ok(Err(err)) if err.aborts_pipeline() => Err(err),
                Ok(Err(err)) => {
                    log_failure::<R>(&err);
                    Ok(ResultEnvelope::failure(&err))
                }
                Err(payload) => {
                    let message = crate::panic::message(&*payload);
                    tracing::error!(request = R::name(), panic = %message, "handler panicked");
                    Ok(ResultEnvelope::failure(&RequestError::Unexpected(message)))
                }
            }
        })
    }
}

fn log_failure<R: Request>(err: &RequestError) {
    if err.kind().is_client_fault() {
        tracing::warn!(request = R::name(), error = %err, "request rejected by handler");
    } else {
        tracing::error!(request = R::name(), error = %err, "request handler failed");
    }
}
