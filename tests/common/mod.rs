//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use pizza_telemetry::config::TelemetryConfig;

/// One request as received by a mock sink.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub at: Instant,
}

impl ReceivedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// A programmable mock sink. Answers request `n` with `statuses[n]`, repeating
/// the last status once the sequence runs out.
#[derive(Clone)]
pub struct MockSink {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

impl MockSink {
    pub async fn start(statuses: Vec<u16>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));

        let store = received.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((socket, _)) => {
                        let store = store.clone();
                        let statuses = statuses.clone();
                        tokio::spawn(async move {
                            handle_connection(socket, store, statuses).await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self { addr, received }
    }

    /// A sink that reads and records each request but never answers it.
    pub async fn silent() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));

        let store = received.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let store = store.clone();
                tokio::spawn(async move {
                    if let Some((request, socket)) = read_request(socket).await {
                        store.lock().unwrap().push(request);
                        // Hold the connection open until the client gives up.
                        let _socket = socket;
                        std::future::pending::<()>().await;
                    }
                });
            }
        });

        Self { addr, received }
    }

    /// A sink that always answers 204.
    pub async fn accepting() -> Self {
        Self::start(vec![204]).await
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.received.lock().unwrap().clone()
    }

    /// Poll until at least `count` requests arrived or `timeout` passes.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<ReceivedRequest> {
        let deadline = Instant::now() + timeout;
        loop {
            let requests = self.requests();
            if requests.len() >= count || Instant::now() >= deadline {
                return requests;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn handle_connection(
    socket: TcpStream,
    store: Arc<Mutex<Vec<ReceivedRequest>>>,
    statuses: Vec<u16>,
) {
    let Some((request, mut socket)) = read_request(socket).await else {
        return;
    };

    let status = {
        let mut received = store.lock().unwrap();
        let index = received.len();
        received.push(request);
        statuses
            .get(index)
            .or_else(|| statuses.last())
            .copied()
            .unwrap_or(204)
    };

    let reason = match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    let response = format!("HTTP/1.1 {status} {reason}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");

    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Read one HTTP/1.1 request with a `Content-Length` body.
async fn read_request(socket: TcpStream) -> Option<(ReceivedRequest, TcpStream)> {
    let mut reader = BufReader::new(socket);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
        return None;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
            return None;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await.ok()?;

    let request = ReceivedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
        at: Instant::now(),
    };
    Some((request, reader.into_inner()))
}

/// Config pointing both sinks at mock servers, with fast retries.
pub fn test_config(metrics: &MockSink, logs: &MockSink) -> TelemetryConfig {
    let mut config = TelemetryConfig::default();

    config.metrics.enabled = true;
    config.metrics.source = "pizza-test".to_string();
    config.metrics.url = metrics.url("/api/v1/push/influx/write");
    config.metrics.user_id = "1111".to_string();
    config.metrics.api_key = "metrics-key".to_string();
    config.metrics.interval_secs = 3600;

    config.logging.enabled = true;
    config.logging.component = "jwt-pizza-service-test".to_string();
    config.logging.url = logs.url("/loki/api/v1/push");
    config.logging.user_id = "2222".to_string();
    config.logging.api_key = "logs-key".to_string();

    config.delivery.max_attempts = 3;
    config.delivery.base_delay_ms = 50;
    config.delivery.max_delay_ms = 500;
    config.delivery.attempt_timeout_secs = 5;

    config
}

/// An HTTP client that ignores proxy environment variables.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
