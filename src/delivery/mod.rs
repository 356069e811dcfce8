//! Delivery of encoded payloads to remote sinks.
//!
//! # Data Flow
//! ```text
//! reporter / logger
//!     → sink.rs (POST with bearer credential)
//!     → resilience (deadline per attempt, linear backoff, attempt ceiling)
//!     → success, or a local report after the last attempt
//! ```
//!
//! # Design Decisions
//! - Metrics and logs use independent sink instances
//! - `dispatch` spawns and returns immediately; the logger ships every
//!   record this way, so nothing waits on the network from a request path
//! - The reporter awaits `send` inside its own background task
//! - Failures never propagate beyond the sink's caller

pub mod sink;

pub use sink::{BearerCredential, DeliveryError, HttpSink, Payload};
