//! Global `tracing` subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::LoggingConfig;

#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter '{directive}': {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("global subscriber already installed: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Filter directive for `-v` counts: 1 info, 2 debug, 3+ trace
#[must_use]
pub fn verbosity_directive(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Pick the filter: CLI verbosity wins, then `RUST_LOG`, then `cfg.level`.
///
/// # Errors
/// [`LoggingError::InvalidFilter`] for a malformed directive.
pub fn build_filter(cfg: &LoggingConfig, verbose: u8) -> Result<EnvFilter, LoggingError> {
    let directive = match verbosity_directive(verbose) {
        Some(directive) => directive.to_owned(),
        None => std::env::var(EnvFilter::DEFAULT_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| cfg.level.clone()),
    };
    EnvFilter::try_new(&directive).map_err(|source| LoggingError::InvalidFilter { directive, source })
}

/// Install the process-wide subscriber: env filter plus a text or JSON
/// formatter on stdout.
///
/// # Errors
/// Fails on a bad filter directive or when a subscriber is already set.
pub fn init_logging(cfg: &LoggingConfig, verbose: u8) -> Result<(), LoggingError> {
    let filter = build_filter(cfg, verbose)?;
    let fmt_layer = if cfg.json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}
