//! Tracing subscriber initialization

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber; diagnostics go to stderr so they never mix
/// with the per-repository lines on stdout.
///
/// `RUST_LOG` takes precedence over the level picked from `verbose`.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact();

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
