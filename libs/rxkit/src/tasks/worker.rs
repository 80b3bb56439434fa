use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::queue::{TaskQueue, WorkItem};

/// The single consumer of a [`TaskQueue`].
///
/// Items run one at a time. A failing or panicking item is logged and the loop
/// moves on. On cancellation the worker stops dequeuing; the item in flight
/// runs to completion.
#[derive(Debug)]
pub struct QueuedWorker {
    queue: TaskQueue,
}

impl QueuedWorker {
    #[must_use]
    pub fn new(queue: TaskQueue) -> Self {
        Self { queue }
    }

    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!("background worker started");
        while let Some(item) = self.queue.dequeue(&cancel).await {
            execute(item, cancel.clone()).await;
        }
        tracing::info!("background worker stopped");
    }

    /// Run the loop on the tokio runtime
    #[must_use]
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}

async fn execute(item: WorkItem, cancel: CancellationToken) {
    let name = item.name().to_owned();
    let started = Instant::now();
    let outcome = AssertUnwindSafe(async move { item.run(cancel).await })
        .catch_unwind()
        .await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(Ok(())) => tracing::debug!(task = %name, elapsed_ms, "work item completed"),
        Ok(Err(err)) => {
            let detail = format!("{err:#}");
            tracing::error!(task = %name, elapsed_ms, error = %detail, "work item failed");
        }
        Err(payload) => {
            let message = crate::panic::message(&*payload);
            tracing::error!(task = %name, elapsed_ms, panic = %message, "work item panicked");
        }
    }
}
