//! Periodic reporting of aggregated metrics.
//!
//! # Data Flow
//! ```text
//! interval tick
//!     → aggregation (snapshot_and_reset + host sample)
//!     → encoding (measurement lines)
//!     → delivery (metrics sink)
//! ```

pub mod scheduler;

pub use scheduler::{FlushOutcome, MetricsReporter};
