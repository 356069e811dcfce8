//! Measurement-line encoding.
//!
//! Lines have the form `measurement,tag=value,... field=value,...`, one per
//! row, newline separated, without timestamps (the sink stamps on receipt).
//! Backslashes, commas, spaces and equals signs in names, tag keys/values and
//! field keys are backslash-escaped. Newlines cannot be escaped and are rejected.

use std::fmt;
use thiserror::Error;

use crate::aggregation::{HostUsage, MetricWindow, TrackedMethod};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    #[error("measurement '{measurement}': tag '{key}' has an empty value")]
    EmptyTag { measurement: String, key: String },

    #[error("measurement '{measurement}': '{value}' contains a line break")]
    InvalidCharacter { measurement: String, value: String },

    #[error("measurement '{measurement}': field '{key}' is not finite")]
    NonFiniteField { measurement: String, key: String },
}

/// A numeric field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Integer(u64),
    Float(f64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        FieldValue::Integer(v as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

/// One encoded measurement. Tags and fields keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricLine {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
}

impl MetricLine {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn field_value(&self, key: &str) -> Option<FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    /// Check the line can be rendered without corrupting the batch.
    pub fn validate(&self) -> Result<(), EncodingError> {
        let names = std::iter::once(&self.measurement)
            .chain(self.tags.iter().flat_map(|(k, v)| [k, v]))
            .chain(self.fields.iter().map(|(k, _)| k));
        for value in names {
            if value.contains(['\n', '\r']) {
                return Err(EncodingError::InvalidCharacter {
                    measurement: self.measurement.clone(),
                    value: value.clone(),
                });
            }
        }
        if let Some((key, _)) = self.tags.iter().find(|(_, v)| v.is_empty()) {
            return Err(EncodingError::EmptyTag {
                measurement: self.measurement.clone(),
                key: key.clone(),
            });
        }
        for (key, value) in &self.fields {
            if let FieldValue::Float(v) = value {
                if !v.is_finite() {
                    return Err(EncodingError::NonFiniteField {
                        measurement: self.measurement.clone(),
                        key: key.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for MetricLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape(&self.measurement, false))?;
        for (key, value) in &self.tags {
            write!(f, ",{}={}", escape(key, true), escape(value, true))?;
        }
        for (i, (key, value)) in self.fields.iter().enumerate() {
            let sep = if i == 0 { ' ' } else { ',' };
            write!(f, "{sep}{}={value}", escape(key, true))?;
        }
        Ok(())
    }
}

fn escape(raw: &str, escape_equals: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '\\' || c == ',' || c == ' ' || (escape_equals && c == '=') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Encode a window snapshot plus a host sample into measurement lines.
pub fn encode(
    window: &MetricWindow,
    host: &HostUsage,
    source: &str,
) -> Result<Vec<MetricLine>, EncodingError> {
    let mut lines: Vec<MetricLine> = TrackedMethod::ALL
        .iter()
        .map(|method| {
            MetricLine::new("http_requests")
                .tag("source", source)
                .tag("method", method.as_str())
                .field("total", window.requests(*method))
        })
        .collect();

    lines.push(
        MetricLine::new("active_users")
            .tag("source", source)
            .field("count", window.active_user_count()),
    );
    lines.push(
        MetricLine::new("auth_attempts")
            .tag("source", source)
            .field("success", window.auth_success())
            .field("failure", window.auth_failure()),
    );
    lines.push(
        MetricLine::new("system_metrics")
            .tag("source", source)
            .field("cpu_usage", host.cpu_percent)
            .field("memory_usage", host.memory_percent),
    );
    lines.push(
        MetricLine::new("pizza_metrics")
            .tag("source", source)
            .field("sold", window.items_sold())
            .field("failures", window.order_failures())
            .field("revenue", window.revenue()),
    );
    lines.push(
        MetricLine::new("pizza_latency")
            .tag("source", source)
            .field("average_ms", window.average_latency_ms()),
    );

    for line in &lines {
        line.validate()?;
    }
    Ok(lines)
}

/// Join lines into one newline-delimited batch.
pub fn render(lines: &[MetricLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{MetricAggregator, OrderItem};

    fn host() -> HostUsage {
        HostUsage { cpu_percent: 12.5, memory_percent: 40.25 }
    }

    #[test]
    fn test_encode_full_window() {
        let aggregator = MetricAggregator::new();
        for _ in 0..3 {
            aggregator.record_request("GET");
        }
        aggregator.record_request("POST");
        aggregator.record_request("POST");
        aggregator.record_active_user("1");
        aggregator.record_auth_attempt(true);
        aggregator.record_auth_attempt(false);
        aggregator.record_order(
            Some(&[OrderItem { price: 2.0 }, OrderItem { price: 3.0 }]),
            true,
            Some(50.0),
        );
        aggregator.record_order(None, false, None);

        let lines = encode(&aggregator.snapshot_and_reset(), &host(), "pizza-test").unwrap();
        let rendered = render(&lines);
        let expected = [
            "http_requests,source=pizza-test,method=GET total=3",
            "http_requests,source=pizza-test,method=POST total=2",
            "http_requests,source=pizza-test,method=PUT total=0",
            "http_requests,source=pizza-test,method=DELETE total=0",
            "active_users,source=pizza-test count=1",
            "auth_attempts,source=pizza-test success=1,failure=1",
            "system_metrics,source=pizza-test cpu_usage=12.5,memory_usage=40.25",
            "pizza_metrics,source=pizza-test sold=2,failures=1,revenue=5",
            "pizza_latency,source=pizza-test average_ms=50",
        ];
        assert_eq!(rendered, expected.join("\n"));
    }

    #[test]
    fn test_every_line_carries_source() {
        let lines = encode(&MetricWindow::default(), &host(), "svc").unwrap();
        assert_eq!(lines.len(), 9);
        assert!(lines.iter().all(|l| l.tag_value("source") == Some("svc")));
    }

    #[test]
    fn test_escaping() {
        let line = MetricLine::new("http requests")
            .tag("source", "a,b=c d")
            .field("total", 1u64);
        assert_eq!(line.to_string(), r"http\ requests,source=a\,b\=c\ d total=1");
    }

    #[test]
    fn test_trailing_backslash_does_not_swallow_delimiter() {
        let line = MetricLine::new("http_requests")
            .tag("source", r"a\")
            .tag("method", "GET")
            .field("total", 2u64);
        assert_eq!(line.to_string(), r"http_requests,source=a\\,method=GET total=2");
    }

    #[test]
    fn test_rejects_line_breaks_and_empty_tags() {
        let err = encode(&MetricWindow::default(), &host(), "bad\nsource").unwrap_err();
        assert!(matches!(err, EncodingError::InvalidCharacter { .. }));

        let err = encode(&MetricWindow::default(), &host(), "").unwrap_err();
        assert!(matches!(err, EncodingError::EmptyTag { .. }));
    }

    #[test]
    fn test_rejects_non_finite_revenue() {
        let aggregator = MetricAggregator::new();
        aggregator.record_order(Some(&[OrderItem { price: f64::NAN }]), true, None);

        let err = encode(&aggregator.snapshot_and_reset(), &host(), "svc").unwrap_err();
        assert_eq!(
            err,
            EncodingError::NonFiniteField {
                measurement: "pizza_metrics".into(),
                key: "revenue".into()
            }
        );
    }
}
