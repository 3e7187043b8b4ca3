//! Tracing setup for binaries and embedding applications.

use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Calling this twice is
/// harmless: the second install is ignored.
///
/// ## Example
/// ```rust,ignore
/// let config = EngineConfig::load_or_default(None);
/// telemetry::init_tracing(&config.logging.filter);
/// ```
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
