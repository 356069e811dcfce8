//! HTTP boundary of the telemetry pipeline.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → capture.rs (count method / user, buffer request body)
//!     → host handlers (out of this crate's scope)
//!     → capture.rs (buffer response body, spawn log dispatch)
//!     → client
//! ```

pub mod capture;
pub mod request;
pub mod server;

pub use capture::{capture_requests, CaptureError, RequestCapture};
pub use request::AuthenticatedUser;
pub use server::{instrument, HttpServer};
