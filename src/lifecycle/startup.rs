//! Startup orchestration.
//!
//! Builds every telemetry component explicitly and hands out the pieces the
//! host application wires into its HTTP layer and business logic. Nothing here
//! is a process-wide singleton.

use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::aggregation::{HostMonitor, MetricAggregator, SysinfoMonitor};
use crate::config::TelemetryConfig;
use crate::delivery::{BearerCredential, HttpSink};
use crate::http::RequestCapture;
use crate::lifecycle::Shutdown;
use crate::logs::{Logger, Redactor};
use crate::reporting::{FlushOutcome, MetricsReporter};
use crate::resilience::RetryPolicy;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Running telemetry pipeline.
pub struct Telemetry {
    aggregator: Arc<MetricAggregator>,
    logger: Logger,
    reporter: Option<Arc<MetricsReporter>>,
    reporter_task: Option<JoinHandle<()>>,
    shutdown: Shutdown,
    max_capture_bytes: usize,
}

impl Telemetry {
    /// Build the pipeline and spawn the reporter. Must run inside a Tokio runtime.
    pub fn start(config: &TelemetryConfig) -> Result<Self, StartupError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::start_with(config, client, Arc::new(SysinfoMonitor::new())))
    }

    /// As [`Telemetry::start`], with the HTTP client and host monitor supplied.
    pub fn start_with(
        config: &TelemetryConfig,
        client: reqwest::Client,
        host: Arc<dyn HostMonitor>,
    ) -> Self {
        let policy = RetryPolicy::from_config(&config.delivery);
        let aggregator = Arc::new(MetricAggregator::new());
        let shutdown = Shutdown::new();

        let log_sink = config.logging.enabled.then(|| {
            HttpSink::new(
                "logs",
                client.clone(),
                config.logging.url.clone(),
                BearerCredential::new(&config.logging.user_id, &config.logging.api_key),
                policy.clone(),
            )
        });
        let logger = Logger::new(
            config.logging.component.clone(),
            log_sink,
            Redactor::new(config.logging.max_field_len),
        );

        let (reporter, reporter_task) = if config.metrics.enabled {
            let sink = HttpSink::new(
                "metrics",
                client,
                config.metrics.url.clone(),
                BearerCredential::new(&config.metrics.user_id, &config.metrics.api_key),
                policy,
            );
            let reporter = Arc::new(MetricsReporter::new(
                aggregator.clone(),
                sink,
                host,
                config.metrics.source.clone(),
                config.metrics.interval(),
            ));
            let task = {
                let reporter = reporter.clone();
                let signal = shutdown.subscribe();
                tokio::spawn(async move { reporter.run(signal).await })
            };
            (Some(reporter), Some(task))
        } else {
            tracing::info!("Metrics reporting disabled");
            (None, None)
        };

        tracing::info!(
            component = %config.logging.component,
            logs_enabled = config.logging.enabled,
            metrics_enabled = config.metrics.enabled,
            "Telemetry pipeline started"
        );

        Self {
            aggregator,
            logger,
            reporter,
            reporter_task,
            shutdown,
            max_capture_bytes: config.logging.max_capture_bytes,
        }
    }

    pub fn aggregator(&self) -> Arc<MetricAggregator> {
        self.aggregator.clone()
    }

    pub fn logger(&self) -> Logger {
        self.logger.clone()
    }

    /// Middleware state for the host router.
    pub fn capture(&self) -> RequestCapture {
        RequestCapture::new(self.aggregator.clone(), self.logger.clone(), self.max_capture_bytes)
    }

    /// Force a flush outside the timer. `None` when reporting is disabled.
    pub async fn flush_now(&self) -> Option<FlushOutcome> {
        match &self.reporter {
            Some(reporter) => Some(reporter.flush().await),
            None => None,
        }
    }

    /// Stop the reporter and wait for its loop to exit.
    pub async fn shutdown(mut self) {
        self.shutdown.trigger();
        if let Some(task) = self.reporter_task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Metrics reporter task failed");
            }
        }
        tracing::info!("Telemetry pipeline stopped");
    }
}
