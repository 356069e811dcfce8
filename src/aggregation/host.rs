//! Host resource sampling.
//!
//! CPU and memory are read fresh at every flush rather than accumulated.

use std::sync::Mutex;
use sysinfo::System;

/// Host usage at one instant, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HostUsage {
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

/// Source of host usage samples.
pub trait HostMonitor: Send + Sync {
    fn sample(&self) -> HostUsage;
}

/// sysinfo-backed monitor.
///
/// The `System` handle is kept between samples so CPU usage covers the time
/// since the previous flush.
pub struct SysinfoMonitor {
    sys: Mutex<System>,
}

impl SysinfoMonitor {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        Self { sys: Mutex::new(sys) }
    }
}

impl Default for SysinfoMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl HostMonitor for SysinfoMonitor {
    fn sample(&self) -> HostUsage {
        let mut sys = self.sys.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let total = sys.total_memory();
        let memory_percent = if total == 0 {
            0.0
        } else {
            sys.used_memory() as f64 / total as f64 * 100.0
        };

        let usage = HostUsage {
            cpu_percent: round2(f64::from(sys.global_cpu_usage())),
            memory_percent: round2(memory_percent),
        };
        tracing::debug!(cpu = usage.cpu_percent, memory = usage.memory_percent, "Host sampled");
        usage
    }
}

/// Monitor that always reports the same values.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedHostMonitor(pub HostUsage);

impl HostMonitor for FixedHostMonitor {
    fn sample(&self) -> HostUsage {
        self.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysinfo_sample_in_range() {
        let monitor = SysinfoMonitor::new();
        let usage = monitor.sample();
        assert!(usage.cpu_percent >= 0.0);
        assert!((0.0..=100.0).contains(&usage.memory_percent));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(0.0), 0.0);
    }
}
