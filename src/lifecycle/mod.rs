//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     TelemetryConfig → sinks → aggregator / logger → spawn reporter
//!
//! Shutdown (shutdown.rs):
//!     trigger → reporter loop exits → task joined
//! ```
//!
//! # Design Decisions
//! - Components are constructed once and passed to the host explicitly
//! - The reporter is a spawned task; it never keeps the process alive

pub mod shutdown;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{StartupError, Telemetry};
