//! # Observability
//!
//! - `metrics`: Prometheus metrics collection
//! - `init_tracing`: structured logging via `tracing-subscriber`

use crate::config::ProvisionerConfig;
use tracing_subscriber::EnvFilter;

pub mod metrics;

pub use metrics::*;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured log level applies to
/// this crate only. Calling it twice is harmless.
pub fn init_tracing(config: &ProvisionerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("alerting_provisioner={}", config.log_level).into());

    // A subscriber installed earlier (tests, embedding callers) keeps precedence
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.log_enable_color)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
