//! Request and business-event telemetry for the JWT Pizza service.
//!
//! Captures per-request and per-event signals, aggregates them into
//! per-interval metric windows, and ships both raw structured logs and the
//! aggregated metrics to remote HTTP sinks without blocking request handling.

// Telemetry core
pub mod aggregation;
pub mod delivery;
pub mod encoding;
pub mod logs;
pub mod reporting;

// Host boundary
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use aggregation::{MetricAggregator, OrderItem};
pub use config::TelemetryConfig;
pub use http::{instrument, AuthenticatedUser, HttpServer, RequestCapture};
pub use lifecycle::Telemetry;
pub use logs::Logger;
