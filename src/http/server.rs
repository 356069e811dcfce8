//! HTTP server setup.
//!
//! # Responsibilities
//! - Wrap any host router with the telemetry layers ([`instrument`])
//! - Provide the demo host: welcome route plus unknown-endpoint fallback
//! - Serve with graceful shutdown

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::any::Any;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::TelemetryConfig;
use crate::http::capture::capture_requests;
use crate::lifecycle::Telemetry;
use crate::logs::{LogType, Logger};

/// Add the telemetry layers to a host router.
///
/// Capture sits outside the panic catcher so a panicking handler still
/// produces an `http_request` record for the 500 it turns into. A host auth
/// layer that inserts `AuthenticatedUser` must be added after this call.
pub fn instrument<S>(router: Router<S>, telemetry: &Telemetry) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let logger = telemetry.logger();
    router
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            report_panic(&logger, panic)
        }))
        .layer(middleware::from_fn_with_state(telemetry.capture(), capture_requests))
}

fn report_panic(logger: &Logger, panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "Unknown panic".to_string()
    };

    tracing::error!(%message, "Handler panicked");
    logger.log_exception(&message, None);

    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": message }))).into_response()
}

/// Demo host server carrying the telemetry layers.
pub struct HttpServer {
    router: Router,
    config: TelemetryConfig,
}

impl HttpServer {
    pub fn new(config: TelemetryConfig, telemetry: &Telemetry) -> Self {
        let router = Self::build_router(&config, telemetry);
        Self { router, config }
    }

    #[allow(deprecated)]
    fn build_router(config: &TelemetryConfig, telemetry: &Telemetry) -> Router {
        let routes = Router::new()
            .route("/", get(welcome))
            .fallback(unknown_endpoint)
            .with_state(telemetry.logger());

        instrument(routes, telemetry)
            .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn welcome() -> Json<Value> {
    Json(json!({
        "message": "Welcome to JWT Pizza",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn unknown_endpoint(State(logger): State<Logger>, method: Method, uri: Uri) -> impl IntoResponse {
    logger.warn(
        LogType::HttpRequest,
        json!({ "message": format!("Unknown endpoint accessed: {method} {uri}") }),
    );
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Unknown endpoint." })))
}
