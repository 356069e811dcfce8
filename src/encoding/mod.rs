//! Encoding of aggregated windows into sink payloads.

pub mod line_protocol;

pub use line_protocol::{encode, render, EncodingError, FieldValue, MetricLine};
