//! Log shipping.
//!
//! A `Logger` builds [`LogRecord`]s, mirrors them to local `tracing`, and
//! ships them to the log sink in the background. Cloning is cheap; every
//! clone ships through the same sink.

use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::delivery::{DeliveryError, HttpSink, Payload};
use crate::logs::record::{LogLevel, LogRecord, LogType};
use crate::logs::redact::Redactor;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// One request/response pair as seen by the capture middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpExchange {
    pub method: String,
    pub path: String,
    pub status_code: u16,
    pub has_auth: bool,
    pub request_body: Value,
    pub response_body: Option<Value>,
}

#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

struct Inner {
    component: String,
    sink: Option<HttpSink>,
    redactor: Redactor,
}

impl Logger {
    pub fn new(component: impl Into<String>, sink: Option<HttpSink>, redactor: Redactor) -> Self {
        Self {
            inner: Arc::new(Inner {
                component: component.into(),
                sink,
                redactor,
            }),
        }
    }

    /// A logger that only emits local `tracing` events.
    pub fn local_only(component: impl Into<String>) -> Self {
        Self::new(component, None, Redactor::default())
    }

    pub fn component(&self) -> &str {
        &self.inner.component
    }

    pub fn redactor(&self) -> Redactor {
        self.inner.redactor
    }

    pub fn record(&self, level: LogLevel, log_type: LogType, body: Value) -> LogRecord {
        LogRecord::now(self.inner.component.clone(), level, log_type, body)
    }

    /// Ship one record and wait for the outcome.
    pub async fn ship(&self, record: &LogRecord) -> Result<(), LogError> {
        metrics::record_log_record(record.level().as_str(), record.log_type().as_str());
        tracing::debug!(
            level = %record.level(),
            log_type = %record.log_type(),
            body = %record.body(),
            "Shipping log record"
        );

        let Some(sink) = &self.inner.sink else {
            return Ok(());
        };
        let payload = Payload::json(record.to_push_body()?);
        sink.send(&payload).await?;
        Ok(())
    }

    /// Ship in the background; returns the task handle when a sink is set.
    pub fn log(&self, level: LogLevel, log_type: LogType, body: Value) -> Option<JoinHandle<()>> {
        let record = self.record(level, log_type, body);
        metrics::record_log_record(level.as_str(), log_type.as_str());

        let Some(sink) = &self.inner.sink else {
            tracing::debug!(level = %level, log_type = %log_type, body = %record.body(), "Log sink disabled, record kept local");
            return None;
        };

        match record.to_push_body() {
            Ok(push) => {
                tracing::debug!(level = %level, log_type = %log_type, body = %record.body(), "Dispatching log record");
                Some(sink.dispatch(Payload::json(push)))
            }
            Err(e) => {
                tracing::error!(log_type = %log_type, error = %LogError::from(e), "Failed to encode log record");
                None
            }
        }
    }

    pub fn info(&self, log_type: LogType, body: Value) -> Option<JoinHandle<()>> {
        self.log(LogLevel::Info, log_type, body)
    }

    pub fn warn(&self, log_type: LogType, body: Value) -> Option<JoinHandle<()>> {
        self.log(LogLevel::Warn, log_type, body)
    }

    pub fn error(&self, log_type: LogType, body: Value) -> Option<JoinHandle<()>> {
        self.log(LogLevel::Error, log_type, body)
    }

    /// Build the `http_request` record for an exchange, bodies redacted.
    pub fn http_request_record(&self, exchange: &HttpExchange) -> LogRecord {
        let redactor = self.inner.redactor;
        let body = json!({
            "method": exchange.method,
            "path": exchange.path,
            "statusCode": exchange.status_code,
            "hasAuth": exchange.has_auth,
            "requestBody": redactor.value(Some(&exchange.request_body)),
            "responseBody": redactor.value(exchange.response_body.as_ref()),
        });
        self.record(LogLevel::Info, LogType::HttpRequest, body)
    }

    pub fn log_http_request(&self, exchange: &HttpExchange) -> Option<JoinHandle<()>> {
        let record = self.http_request_record(exchange);
        self.log(record.level(), record.log_type(), record.body().clone())
    }

    pub fn log_db_query(&self, query: &str, params: &Value, duration_ms: f64) -> Option<JoinHandle<()>> {
        let redactor = self.inner.redactor;
        self.info(
            LogType::DbQuery,
            json!({
                "query": redactor.text(Some(query)),
                "params": redactor.value(Some(params)),
                "durationMs": duration_ms,
            }),
        )
    }

    pub fn log_exception(&self, message: &str, stack: Option<&str>) -> Option<JoinHandle<()>> {
        let redactor = self.inner.redactor;
        self.error(
            LogType::Exception,
            json!({
                "message": redactor.text(Some(message)),
                "stack": redactor.text(stack),
            }),
        )
    }
}
