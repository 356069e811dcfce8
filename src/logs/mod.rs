//! Structured log capture and shipping.
//!
//! # Data Flow
//! ```text
//! capture middleware / exception handler / db layer
//!     → logger.rs (build LogRecord, fields through redact.rs)
//!     → record.rs (push-body serialization)
//!     → delivery (log sink, background task)
//! ```

pub mod logger;
pub mod record;
pub mod redact;

pub use logger::{HttpExchange, LogError, Logger};
pub use record::{LogLevel, LogRecord, LogType};
pub use redact::Redactor;
