//! Shared setup for the runnable loadkit demos

use tracing_subscriber::EnvFilter;

/// Route library logs to stderr, honoring `RUST_LOG` when set
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
