//! Local structured logging.
//!
//! Diagnostics about the pipeline itself (failed deliveries, encoding errors,
//! capture failures) go through `tracing`; only records built by
//! `logs::Logger` are shipped to the remote log sink.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("pizza_telemetry={default_level},tower_http={default_level}"))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
