//! Metric aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! request / auth / order call sites
//!     → aggregator.rs (record_* under one lock)
//!     → window.rs (MetricWindow for the current period)
//!
//! reporter tick
//!     → aggregator.snapshot_and_reset()
//!     → host.rs (fresh CPU / memory sample)
//!     → encoding
//! ```

pub mod aggregator;
pub mod host;
pub mod window;

pub use aggregator::MetricAggregator;
pub use host::{FixedHostMonitor, HostMonitor, HostUsage, SysinfoMonitor};
pub use window::{MetricWindow, OrderItem, TrackedMethod};
