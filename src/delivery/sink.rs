//! HTTP sink with bounded retry.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::logs::redact::truncate;
use crate::observability::metrics;
use crate::resilience::{with_deadline, RetryPolicy};

/// Errors from pushing a payload to a sink.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Sink answered with a non-success status.
    #[error("sink responded {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection or protocol failure.
    #[error("network error: {0}")]
    Network(String),

    /// Attempt exceeded its deadline.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    /// Every attempt failed.
    #[error("all {attempts} attempts failed, last error: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<DeliveryError>,
    },
}

/// The `{userId}:{apiKey}` bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential {
    user_id: String,
    api_key: String,
}

impl BearerCredential {
    pub fn new(user_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            api_key: api_key.into(),
        }
    }

    pub fn header_value(&self) -> String {
        format!("Bearer {}:{}", self.user_id, self.api_key)
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerCredential")
            .field("user_id", &self.user_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// A request body plus its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub body: String,
    pub content_type: &'static str,
}

impl Payload {
    pub fn text(body: String) -> Self {
        Self { body, content_type: "text/plain" }
    }

    pub fn json(body: String) -> Self {
        Self { body, content_type: "application/json" }
    }
}

/// A remote endpoint that accepts POSTed payloads.
#[derive(Debug, Clone)]
pub struct HttpSink {
    name: &'static str,
    client: reqwest::Client,
    url: String,
    credential: BearerCredential,
    policy: RetryPolicy,
}

impl HttpSink {
    pub fn new(
        name: &'static str,
        client: reqwest::Client,
        url: impl Into<String>,
        credential: BearerCredential,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            name,
            client,
            url: url.into(),
            credential,
            policy,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// POST `payload`, retrying per the policy.
    ///
    /// Failed attempts are reported through `tracing` as they happen; the
    /// returned error is for the caller's bookkeeping only.
    pub async fn send(&self, payload: &Payload) -> Result<(), DeliveryError> {
        let start = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.attempt(payload).await {
                Ok(()) => {
                    metrics::record_delivery_attempt(self.name, "success");
                    metrics::record_delivery_result(self.name, true, start);
                    tracing::debug!(sink = self.name, attempt, "Payload delivered");
                    return Ok(());
                }
                Err(e) => {
                    metrics::record_delivery_attempt(self.name, "failure");
                    tracing::warn!(sink = self.name, attempt, error = %e, "Delivery attempt failed");

                    if !self.policy.should_retry(attempt) {
                        metrics::record_delivery_result(self.name, false, start);
                        tracing::error!(sink = self.name, attempts = attempt, "All retry attempts failed");
                        return Err(DeliveryError::RetriesExhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }

                    let backoff = self.policy.backoff(attempt);
                    tracing::debug!(sink = self.name, attempt, delay = ?backoff, "Retrying delivery");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    async fn attempt(&self, payload: &Payload) -> Result<(), DeliveryError> {
        let request = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, self.credential.header_value())
            .header(CONTENT_TYPE, payload.content_type)
            .body(payload.body.clone());

        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| DeliveryError::Network(e.to_string()))?;

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }
            let body = response.text().await.unwrap_or_default();
            Err::<(), DeliveryError>(DeliveryError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            })
        };

        with_deadline(self.policy.attempt_timeout, exchange)
            .await
            .map_err(|elapsed| DeliveryError::Timeout(elapsed.0))?
    }

    /// Send in the background. The caller never waits on the network.
    pub fn dispatch(&self, payload: Payload) -> JoinHandle<()> {
        let sink = self.clone();
        tokio::spawn(async move {
            // Failures were already reported inside `send`.
            let _ = sink.send(&payload).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header() {
        let credential = BearerCredential::new("1234", "glc_key");
        assert_eq!(credential.header_value(), "Bearer 1234:glc_key");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let credential = BearerCredential::new("1234", "glc_key");
        let debug = format!("{credential:?}");
        assert!(debug.contains("1234"));
        assert!(!debug.contains("glc_key"));
    }

    #[test]
    fn test_exhausted_error_display() {
        let err = DeliveryError::RetriesExhausted {
            attempts: 3,
            last: Box::new(DeliveryError::Status { status: 503, body: "busy".into() }),
        };
        assert_eq!(err.to_string(), "all 3 attempts failed, last error: sink responded 503: busy");
    }

    #[tokio::test]
    async fn test_unreachable_sink_gives_up() {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            attempt_timeout: Duration::from_secs(2),
        };
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        // Port 9 (discard) is closed on test hosts; connect fails fast.
        let sink = HttpSink::new(
            "metrics",
            client,
            "http://127.0.0.1:9/push",
            BearerCredential::new("u", "k"),
            policy,
        );

        let err = sink.send(&Payload::text("m v=1".into())).await.unwrap_err();
        assert!(matches!(err, DeliveryError::RetriesExhausted { attempts: 2, .. }));
    }
}
