//! Periodic metric reporting.
//!
//! Each tick swaps the aggregation window out, encodes it together with a
//! fresh host sample, and pushes the batch to the metrics sink. The window is
//! gone once swapped: a failed push drops that period's data.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::aggregation::{HostMonitor, MetricAggregator};
use crate::delivery::{HttpSink, Payload};
use crate::encoding::{encode, render};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// Result of one flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    Delivered { lines: usize },
    EncodingFailed,
    DeliveryFailed,
}

pub struct MetricsReporter {
    aggregator: Arc<MetricAggregator>,
    sink: HttpSink,
    host: Arc<dyn HostMonitor>,
    source: String,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(
        aggregator: Arc<MetricAggregator>,
        sink: HttpSink,
        host: Arc<dyn HostMonitor>,
        source: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            aggregator,
            sink,
            host,
            source: source.into(),
            interval,
        }
    }

    /// Snapshot, encode and push the current window.
    pub async fn flush(&self) -> FlushOutcome {
        let window = self.aggregator.snapshot_and_reset();
        let host = self.host.sample();

        let lines = match encode(&window, &host, &self.source) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode metrics, window discarded");
                metrics::record_flush("encoding_failed");
                return FlushOutcome::EncodingFailed;
            }
        };

        let batch = render(&lines);
        tracing::debug!(lines = lines.len(), batch = %batch, "Pushing metrics");

        match self.sink.send(&Payload::text(batch)).await {
            Ok(()) => {
                metrics::record_flush("delivered");
                tracing::info!(lines = lines.len(), "Metrics pushed");
                FlushOutcome::Delivered { lines: lines.len() }
            }
            Err(e) => {
                metrics::record_flush("delivery_failed");
                tracing::error!(error = %e, "Metrics window dropped");
                FlushOutcome::DeliveryFailed
            }
        }
    }

    /// Flush every interval until shutdown.
    ///
    /// Flushes run inline in this loop, so two never overlap; a slow push
    /// delays the next tick instead of stacking another one. Shutdown wins
    /// over a ready tick and abandons a push still in flight; that window is
    /// lost like any other failed push.
    pub async fn run(&self, mut shutdown: ShutdownSignal) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            source = %self.source,
            "Metrics reporter starting"
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Metrics reporter received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = shutdown.recv() => {
                            tracing::warn!("Shutdown during metrics push, abandoning it");
                            break;
                        }
                        _ = self.flush() => {}
                    }
                }
            }
        }
    }
}
