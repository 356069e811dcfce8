//! Process-wide metric aggregation.
//!
//! Every `record_*` call takes a short critical section on one mutex. The
//! flush path swaps the whole window out under the same lock, so a record
//! racing a swap lands in exactly one window.

use std::sync::{Mutex, MutexGuard};

use crate::aggregation::window::{MetricWindow, OrderItem, TrackedMethod};

#[derive(Debug, Default)]
pub struct MetricAggregator {
    window: Mutex<MetricWindow>,
}

impl MetricAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MetricWindow> {
        // A panic mid-update leaves at worst one partially bumped counter.
        self.window.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count a request. Methods outside GET/POST/PUT/DELETE are ignored.
    pub fn record_request(&self, method: &str) {
        let Some(method) = TrackedMethod::from_method(method) else {
            return;
        };
        let mut window = self.lock();
        window.increment_requests(method);
        tracing::trace!(%method, count = window.requests(method), "Request counted");
    }

    pub fn record_active_user(&self, user_id: &str) {
        let mut window = self.lock();
        if !window.active_users.contains(user_id) {
            window.active_users.insert(user_id.to_string());
        }
    }

    pub fn record_auth_attempt(&self, success: bool) {
        let mut window = self.lock();
        if success {
            window.auth_success += 1;
        } else {
            window.auth_failure += 1;
        }
    }

    /// Record an order-creation outcome.
    ///
    /// A successful order adds its items to sold/revenue (zero for an empty or
    /// absent item list) and keeps the latency sample; a failed one only bumps
    /// the failure counter.
    pub fn record_order(&self, items: Option<&[OrderItem]>, success: bool, latency_ms: Option<f64>) {
        let mut window = self.lock();
        if !success {
            window.order_failures += 1;
            tracing::debug!(failures = window.order_failures, "Order failure recorded");
            return;
        }

        let items = items.unwrap_or_default();
        window.items_sold += items.len() as u64;
        window.revenue += items.iter().map(|item| item.price).sum::<f64>();
        if let Some(latency) = latency_ms {
            window.order_latencies_ms.push(latency);
        }
        tracing::debug!(
            sold = window.items_sold,
            revenue = window.revenue,
            "Order recorded"
        );
    }

    /// Return the current window and start a fresh one.
    pub fn snapshot_and_reset(&self) -> MetricWindow {
        std::mem::take(&mut *self.lock())
    }

    /// Copy of the current window without resetting it.
    pub fn peek(&self) -> MetricWindow {
        self.lock().clone()
    }
}
