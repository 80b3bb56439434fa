//! One span per request with outcome and timing.

use std::task::{Context, Poll};
use std::time::Instant;

use futures::future::BoxFuture;
use tower::{Layer, Service};
use tracing::{Instrument, field};

use crate::envelope::ResultEnvelope;
use crate::error::RequestError;
use crate::request::{Call, Request};

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLayer;

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService { inner }
    }
}

#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
}

impl<S, R> Service<Call<R>> for TracingService<S>
where
    R: Request,
    S: Service<Call<R>, Response = ResultEnvelope<R::Response>, Error = RequestError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = RequestError;
    type Future = BoxFuture<'static, Result<S::Response, RequestError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, call: Call<R>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let span = tracing::info_span!("request", request = R::name(), user_id = field::Empty);
        if let Some(id) = call.ctx.user().id() {
            span.record("user_id", field::display(id));
        }

        Box::pin(
            async move {
                let started = Instant::now();
                let result = inner.call(call).await;
                let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                match &result {
                    Ok(envelope) if envelope.is_success() => {
                        tracing::debug!(elapsed_ms, "request completed");
                    }
                    Ok(envelope) => {
                        tracing::info!(
                            elapsed_ms,
                            errors = envelope.errors().len(),
                            "request completed with failure"
                        );
                    }
                    Err(err) => {
                        tracing::info!(elapsed_ms, error = %err, "request rejected");
                    }
                }
                result
            }
            .instrument(span),
        )
    }
}
