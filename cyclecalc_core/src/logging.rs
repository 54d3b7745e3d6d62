//! Tracing setup for the `cyclecalc` binary.
//!
//! Logs always go to stderr; stdout is reserved for calculator output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber at `info`
pub fn init() {
    init_with_level("info")
}

/// Install the global subscriber at `default_level` unless `RUST_LOG` is set
///
/// `--verbose` passes `"debug"` here.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Debug-level logging routed through the test harness' captured output
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
