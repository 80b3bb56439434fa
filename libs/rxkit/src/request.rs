use rxkit_security::{CurrentUser, Requirements};
use tokio_util::sync::CancellationToken;

/// An operation sent through the pipeline, query or command alike.
pub trait Request: Send + 'static {
    type Response: Send + 'static;

    /// Name used in logs and spans
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Per-request context passed explicitly down the call chain.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    user: CurrentUser,
    cancel: CancellationToken,
}

impl RequestContext {
    #[must_use]
    pub fn new(user: CurrentUser, cancel: CancellationToken) -> Self {
        Self { user, cancel }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_user(user: CurrentUser) -> Self {
        Self::new(user, CancellationToken::new())
    }

    #[must_use]
    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// A request together with who sent it and what they must be allowed to do.
#[derive(Debug)]
pub struct Call<R> {
    pub request: R,
    pub ctx: RequestContext,
    pub requirements: Requirements,
}

impl<R: Request> Call<R> {
    /// A call without requirements
    #[must_use]
    pub fn new(request: R, ctx: RequestContext) -> Self {
        Self {
            request,
            ctx,
            requirements: Requirements::none(),
        }
    }

    #[must_use]
    pub fn require(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }
}
