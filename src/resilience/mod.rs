//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Sink delivery:
//!     → timeouts.rs (deadline per attempt)
//!     → On failure: retries.rs (attempt ceiling)
//!     → backoff.rs (linear delay before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Every outbound call has a deadline
//! - Backoff grows linearly with the attempt number
//! - Exhausted retries are reported, never raised into callers

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::RetryPolicy;
pub use timeouts::{with_deadline, DeadlineElapsed};
