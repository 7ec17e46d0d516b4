//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "warn,poketrade_market=info";

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

/// Initialize tracing subscriber, falling back to `default_filter` when
/// `RUST_LOG` is unset or invalid.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing_with(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}
