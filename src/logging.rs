//! Logging setup for the command-line tool.
//!
//! The `dol` crate emits records through the `log` facade; they are forwarded to a
//! `tracing_subscriber` formatter writing to stderr, so the report on stdout stays clean.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the `verbose` flag when set.
pub fn init(verbose: bool) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        default_filter(verbose)
    };

    // Also installs the `log` to `tracing` bridge
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "trace" } else { "info" })
}
