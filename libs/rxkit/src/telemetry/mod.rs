pub mod logging;

pub use logging::{LoggingError, init_logging};
