#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Request pipeline and runtime plumbing shared by the pharmacy modules.
//!
//! A request travels `Mediator::send` -> tracing -> authorization -> handler
//! base -> handler. The handler base turns handler faults into a failed
//! [`ResultEnvelope`]; only access denial and cancellation come back as `Err`.

pub mod config;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod mediator;
pub mod pipeline;
pub mod registry;
pub mod request;
pub mod runtime;
pub mod tasks;
pub mod telemetry;

mod panic;

pub use config::{AppConfig, ConfigError, ConfigProvider};
pub use envelope::ResultEnvelope;
pub use error::RequestError;
pub use handler::{HandlerService, RequestHandler};
pub use mediator::Mediator;
pub use registry::{HandlerRegistry, RegistryError};
pub use request::{Call, Request, RequestContext};
pub use tasks::{QueuedWorker, TaskQueue, WorkItem};

// Re-exported so request and handler crates name one version of these.
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
