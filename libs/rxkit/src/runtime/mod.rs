pub mod shutdown;

pub use shutdown::{drain_worker, wait_for_shutdown};
