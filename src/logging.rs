//! Logging and tracing utilities.
//!
//! Helpers for setting up structured logging with the `tracing` ecosystem.
//! Logs are written to **stderr**, keeping stdout free for whatever drives
//! the provider.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls log levels (e.g., `info`, `debug`,
//!   `sensu_provider=debug`)

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the default logging subscriber.
///
/// Sets up a `tracing` subscriber that writes to stderr, respects the
/// `RUST_LOG` environment variable, and defaults to `info` level when
/// `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Unlike [`init_logging`], this does not panic when a subscriber has
/// already been set, which matters in tests and embedders that initialize
/// more than once.
pub fn try_init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    // The global subscriber can only be set once per process, so
    // initialization itself is not unit-testable here; we check the filter
    // syntax the helpers rely on.

    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("debug").is_ok());
        assert!(EnvFilter::try_new("sensu_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,sensu_provider=debug").is_ok());
    }
}
