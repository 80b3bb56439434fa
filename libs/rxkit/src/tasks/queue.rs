use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

type Action = Box<dyn FnOnce(CancellationToken) -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// A deferred action. It receives the worker's cancellation token and is
/// expected to observe it cooperatively.
pub struct WorkItem {
    name: String,
    action: Action,
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl WorkItem {
    pub fn new<F, Fut>(name: impl Into<String>, action: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            action: Box::new(move |cancel| action(cancel).boxed()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn run(self, cancel: CancellationToken) -> anyhow::Result<()> {
        (self.action)(cancel).await
    }
}

/// Multi-producer, single-consumer FIFO of [`WorkItem`]s.
///
/// Cloning yields another producer handle onto the same queue.
#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<WorkItem>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<WorkItem>>>,
}

impl Default for TaskQueue {
    fn default() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("producers", &self.tx.strong_count())
            .finish_non_exhaustive()
    }
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item. Never blocks.
    pub fn enqueue(&self, item: WorkItem) {
        tracing::debug!(task = item.name(), "work item queued");
        // The receiver lives as long as any handle, so the send cannot fail
        // while `self` exists.
        if let Err(mpsc::error::SendError(item)) = self.tx.send(item) {
            tracing::warn!(task = item.name(), "task queue closed, work item dropped");
        }
    }

    /// Wait for the next item in enqueue order. Returns `None` once `cancel`
    /// fires.
    pub async fn dequeue(&self, cancel: &CancellationToken) -> Option<WorkItem> {
        let mut rx = tokio::select! {
            biased;
            () = cancel.cancelled() => return None,
            rx = self.rx.lock() => rx,
        };
        tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            item = rx.recv() => item,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn noop(name: &str) -> WorkItem {
        WorkItem::new(name, |_| async { Ok(()) })
    }

    #[tokio::test]
    async fn dequeues_in_enqueue_order() {
        let queue = TaskQueue::new();
        for n in ["1", "2", "3"] {
            queue.enqueue(noop(n));
        }
        let cancel = CancellationToken::new();
        let mut names = Vec::new();
        for _ in 0..3 {
            names.push(queue.dequeue(&cancel).await.unwrap().name().to_owned());
        }
        assert_eq!(names, ["1", "2", "3"]);
    }

    #[tokio::test]
    async fn dequeue_waits_for_an_item() {
        let queue = TaskQueue::new();
        let producer = queue.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            producer.enqueue(noop("late"));
        });
        let item = queue.dequeue(&CancellationToken::new()).await.unwrap();
        assert_eq!(item.name(), "late");
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_wait() {
        let queue = TaskQueue::new();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let next = tokio::time::timeout(Duration::from_secs(5), queue.dequeue(&cancel))
            .await
            .expect("dequeue should return after cancellation");
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn item_receives_the_token() {
        let item = WorkItem::new("observe", |cancel| async move {
            anyhow::ensure!(cancel.is_cancelled(), "token not propagated");
            Ok(())
        });
        let cancel = CancellationToken::new();
        cancel.cancel();
        item.run(cancel).await.unwrap();
    }
}
