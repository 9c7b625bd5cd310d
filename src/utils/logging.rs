// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Sets up the logging framework using tracing_subscriber.
/// Reads log level filters from the `RUST_LOG` environment variable.
/// Defaults to "info" if `RUST_LOG` is not set. Calling it twice is harmless.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("Global subscriber already installed; keeping it");
        return;
    }

    tracing::debug!("Logging setup complete.");
}
