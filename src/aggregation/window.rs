//! The accumulation state for one reporting window.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// HTTP methods the pipeline counts. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl TrackedMethod {
    pub const ALL: [TrackedMethod; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    /// Map a request method onto the tracked set.
    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TrackedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line item of an order, as reported by the order-creation call site.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct OrderItem {
    pub price: f64,
}

/// Counters, sets and samples accumulated between two flushes.
///
/// Counters are unsigned, so they cannot go negative; the user set
/// deduplicates by construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricWindow {
    requests: [u64; 4],
    pub(crate) active_users: HashSet<String>,
    pub(crate) auth_success: u64,
    pub(crate) auth_failure: u64,
    pub(crate) items_sold: u64,
    pub(crate) revenue: f64,
    pub(crate) order_failures: u64,
    pub(crate) order_latencies_ms: Vec<f64>,
}

impl MetricWindow {
    pub fn requests(&self, method: TrackedMethod) -> u64 {
        self.requests[method.index()]
    }

    pub(crate) fn increment_requests(&mut self, method: TrackedMethod) {
        self.requests[method.index()] += 1;
    }

    pub fn active_user_count(&self) -> usize {
        self.active_users.len()
    }

    pub fn has_active_user(&self, user_id: &str) -> bool {
        self.active_users.contains(user_id)
    }

    pub fn auth_success(&self) -> u64 {
        self.auth_success
    }

    pub fn auth_failure(&self) -> u64 {
        self.auth_failure
    }

    pub fn items_sold(&self) -> u64 {
        self.items_sold
    }

    pub fn revenue(&self) -> f64 {
        self.revenue
    }

    pub fn order_failures(&self) -> u64 {
        self.order_failures
    }

    pub fn order_latencies_ms(&self) -> &[f64] {
        &self.order_latencies_ms
    }

    /// Mean order-creation latency, or 0 when nothing was sampled.
    pub fn average_latency_ms(&self) -> f64 {
        if self.order_latencies_ms.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.order_latencies_ms.iter().sum();
        sum / self.order_latencies_ms.len() as f64
    }

    /// True when nothing at all was recorded.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
