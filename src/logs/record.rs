//! Structured log records and the log-sink wire format.
//!
//! ```text
//! { "streams": [ { "stream": {component, level, type},
//!                  "values": [[ "<ns timestamp>", "<json body>" ]] } ] }
//! ```

use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    HttpRequest,
    DbQuery,
    Exception,
}

impl LogType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HttpRequest => "http_request",
            Self::DbQuery => "db_query",
            Self::Exception => "exception",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured event, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    level: LogLevel,
    log_type: LogType,
    component: String,
    body: Value,
    timestamp_ns: i64,
}

impl LogRecord {
    pub fn new(
        component: impl Into<String>,
        level: LogLevel,
        log_type: LogType,
        body: Value,
        timestamp_ns: i64,
    ) -> Self {
        Self {
            level,
            log_type,
            component: component.into(),
            body,
            timestamp_ns,
        }
    }

    /// Stamp with the current wall-clock time.
    pub fn now(component: impl Into<String>, level: LogLevel, log_type: LogType, body: Value) -> Self {
        let timestamp_ns = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Self::new(component, level, log_type, body, timestamp_ns)
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn log_type(&self) -> LogType {
        self.log_type
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn timestamp_ns(&self) -> i64 {
        self.timestamp_ns
    }

    /// Serialize into the push body expected by the log sink.
    pub fn to_push_body(&self) -> Result<String, serde_json::Error> {
        let push = PushRequest {
            streams: [Stream {
                stream: StreamLabels {
                    component: &self.component,
                    level: self.level,
                    log_type: self.log_type,
                },
                values: [[self.timestamp_ns.to_string(), serde_json::to_string(&self.body)?]],
            }],
        };
        serde_json::to_string(&push)
    }
}

#[derive(Serialize)]
struct PushRequest<'a> {
    streams: [Stream<'a>; 1],
}

#[derive(Serialize)]
struct Stream<'a> {
    stream: StreamLabels<'a>,
    values: [[String; 2]; 1],
}

#[derive(Serialize)]
struct StreamLabels<'a> {
    component: &'a str,
    level: LogLevel,
    #[serde(rename = "type")]
    log_type: LogType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_body_shape() {
        let record = LogRecord::new(
            "jwt-pizza-service",
            LogLevel::Warn,
            LogType::DbQuery,
            json!({"query": "SELECT 1"}),
            1_700_000_000_000_000_000,
        );

        let push: Value = serde_json::from_str(&record.to_push_body().unwrap()).unwrap();
        assert_eq!(
            push,
            json!({
                "streams": [{
                    "stream": {"component": "jwt-pizza-service", "level": "warn", "type": "db_query"},
                    "values": [["1700000000000000000", r#"{"query":"SELECT 1"}"#]]
                }]
            })
        );
    }

    #[test]
    fn test_now_uses_nanoseconds() {
        let record = LogRecord::now("c", LogLevel::Info, LogType::HttpRequest, Value::Null);
        // Any current time in ns is well past 1e18.
        assert!(record.timestamp_ns() > 1_000_000_000_000_000_000);
    }
}
