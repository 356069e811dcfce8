//! Observability of the pipeline itself.
//!
//! # Data Flow
//! ```text
//! delivery / reporter / capture
//!     → logging.rs (local tracing events)
//!     → metrics.rs (self-metrics via the `metrics` facade)
//!
//! Consumers:
//!     → stdout
//!     → optional Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;
