//! Logging setup for hosts embedding the library.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a formatted `tracing` subscriber filtered by `RUST_LOG`
/// (default `info`). Returns false if a global subscriber was already set.
pub fn init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
