//! Diagnostic logging for the ledger.
//!
//! Events go to stderr so that command output on stdout stays clean.
//! `RUST_LOG` takes precedence; otherwise `--verbose` selects `debug`
//! and the default level is `warn`.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Calling it more than once is harmless.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("finman={default_level},sqlx=warn")));

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_log)
        .try_init();
}
