//! Request/response capture middleware.
//!
//! Per request: count the method and active user, buffer the (bounded) JSON
//! request body, run the handler, buffer the (bounded) response body and hand
//! both back unchanged to the rest of the stack. The `http_request` log record
//! is built and shipped from a spawned task after the response is returned.
//!
//! Lifecycle per request: pending → response sent → log dispatched. At most
//! one log attempt per exchange; nothing here can change the response.

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{Request, State},
    http::{header, request, response, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::aggregation::MetricAggregator;
use crate::http::request::{has_authorization, is_json, AuthenticatedUser};
use crate::logs::{HttpExchange, LogError, Logger};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to buffer {0} body: {1}")]
    Body(&'static str, String),

    #[error("failed to log HTTP request: {0}")]
    Log(#[from] LogError),
}

/// Middleware state: where captured signals go.
#[derive(Clone)]
pub struct RequestCapture {
    aggregator: Arc<MetricAggregator>,
    logger: Logger,
    max_body_bytes: usize,
}

impl RequestCapture {
    pub fn new(aggregator: Arc<MetricAggregator>, logger: Logger, max_body_bytes: usize) -> Self {
        Self {
            aggregator,
            logger,
            max_body_bytes,
        }
    }

    fn fits(&self, body: &Body) -> bool {
        body.size_hint()
            .upper()
            .is_some_and(|upper| upper <= self.max_body_bytes as u64)
    }

    /// Buffer a JSON request body and return a shallow copy of it.
    ///
    /// Anything that is not a bounded JSON object is logged as `{}` and the
    /// request passes through untouched. A body that fails mid-read is
    /// answered with 400 instead of reaching the handler truncated.
    async fn read_request_body(&self, request: Request) -> Result<(Request, Value), Response> {
        if !is_json(request.headers()) || !self.fits(request.body()) {
            return Ok((request, json!({})));
        }

        let (parts, body) = request.into_parts();
        let buffered = axum::body::to_bytes(body, self.max_body_bytes).await;
        restore_request(parts, buffered)
    }

    /// Buffer a bounded response body. Streaming or oversized bodies are not
    /// captured and pass through as they are.
    async fn read_response_body(&self, response: Response) -> (Response, Option<Value>) {
        if !self.fits(response.body()) {
            return (response, None);
        }

        let (parts, body) = response.into_parts();
        let buffered = axum::body::to_bytes(body, self.max_body_bytes).await;
        restore_response(parts, buffered)
    }

    fn dispatch(&self, exchange: HttpExchange) {
        let logger = self.logger.clone();
        tokio::spawn(async move {
            let record = logger.http_request_record(&exchange);
            if let Err(e) = logger.ship(&record).await.map_err(CaptureError::from) {
                tracing::warn!(method = %exchange.method, path = %exchange.path, error = %e, "HTTP request log dropped");
            }
        });
    }
}

fn restore_request(
    parts: request::Parts,
    buffered: Result<Bytes, axum::Error>,
) -> Result<(Request, Value), Response> {
    match buffered {
        Ok(bytes) => {
            let captured = match serde_json::from_slice::<Value>(&bytes) {
                Ok(value @ Value::Object(_)) => value,
                _ => json!({}),
            };
            Ok((Request::from_parts(parts, Body::from(bytes)), captured))
        }
        Err(e) => {
            let e = CaptureError::Body("request", e.to_string());
            tracing::warn!(error = %e, "Request body capture failed");
            Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Failed to read request body" })),
            )
                .into_response())
        }
    }
}

/// Rebuild the response around its buffered body. When buffering failed the
/// body is gone; the empty replacement must not advertise the old length.
fn restore_response(
    mut parts: response::Parts,
    buffered: Result<Bytes, axum::Error>,
) -> (Response, Option<Value>) {
    match buffered {
        Ok(bytes) => {
            let captured = parse_body(&bytes);
            (Response::from_parts(parts, Body::from(bytes)), captured)
        }
        Err(e) => {
            let e = CaptureError::Body("response", e.to_string());
            tracing::warn!(error = %e, "Response body capture failed");
            parts.headers.remove(header::CONTENT_LENGTH);
            (Response::from_parts(parts, Body::empty()), None)
        }
    }
}

/// JSON bodies (structured sends) are kept as JSON; anything else (raw sends)
/// as text.
fn parse_body(bytes: &Bytes) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}

/// Axum middleware entry point; install with
/// `axum::middleware::from_fn_with_state(capture, capture_requests)`.
pub async fn capture_requests(
    State(capture): State<RequestCapture>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().as_str().to_string();
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let has_auth = has_authorization(request.headers());

    capture.aggregator.record_request(&method);
    if let Some(user) = request.extensions().get::<AuthenticatedUser>() {
        capture.aggregator.record_active_user(&user.id);
    }

    let (response, request_body) = match capture.read_request_body(request).await {
        Ok((request, request_body)) => (next.run(request).await, request_body),
        Err(rejection) => (rejection, json!({})),
    };
    let status_code = response.status().as_u16();
    let (response, response_body) = capture.read_response_body(response).await;

    capture.dispatch(HttpExchange {
        method,
        path,
        status_code,
        has_auth,
        request_body,
        response_body,
    });

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_error() -> axum::Error {
        axum::Error::new(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
    }

    #[test]
    fn test_failed_request_body_is_rejected() {
        let (parts, _) = Request::builder()
            .method("POST")
            .uri("/api/order")
            .header(header::CONTENT_LENGTH, "42")
            .body(Body::empty())
            .unwrap()
            .into_parts();

        let rejection = restore_request(parts, Err(stream_error())).unwrap_err();
        assert_eq!(rejection.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_buffered_request_body_is_kept() {
        let (parts, _) = Request::builder().body(Body::empty()).unwrap().into_parts();
        let bytes = Bytes::from_static(b"[1,2]");

        let (request, captured) = restore_request(parts, Ok(bytes)).unwrap();
        assert_eq!(captured, json!({}));
        assert_eq!(request.body().size_hint().exact(), Some(5));
    }

    #[test]
    fn test_failed_response_body_drops_content_length() {
        let (parts, _) = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, "42")
            .body(Body::empty())
            .unwrap()
            .into_parts();

        let (response, captured) = restore_response(parts, Err(stream_error()));
        assert_eq!(captured, None);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
        assert_eq!(response.body().size_hint().exact(), Some(0));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(&Bytes::new()), None);
        assert_eq!(parse_body(&Bytes::from_static(b"{\"a\":1}")), Some(json!({"a": 1})));
        assert_eq!(
            parse_body(&Bytes::from_static(b"plain text")),
            Some(json!("plain text"))
        );
    }
}
