//! In-process background work: an unbounded FIFO queue drained by one worker.
//!
//! Items are not persisted. Whatever is still queued at shutdown is dropped.

pub mod queue;
pub mod worker;

pub use queue::{TaskQueue, WorkItem};
pub use worker::QueuedWorker;
