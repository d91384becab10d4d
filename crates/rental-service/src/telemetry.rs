//! # Tracing Setup
//!
//! Installs the global `tracing` subscriber.

use tracing_subscriber::EnvFilter;

/// Initializes tracing/logging.
///
/// `RUST_LOG` wins over `default_filter`. Calling this more than once is
/// harmless: only the first subscriber is installed.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("Tracing initialized");
    }
}
