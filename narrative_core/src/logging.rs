//! Tracing setup for hosts embedding the engine.

use tracing_subscriber::EnvFilter;

/// Install a compact fmt subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise `default_filter`
/// (for example `"info"` or `"narrative_core=debug"`). Returns `false` if a
/// global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}
