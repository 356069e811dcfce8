//! Linear backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Delay to wait after failed attempt number `attempt` (1-based).
///
/// Grows as `attempt × base_ms`, capped at `max_ms`, plus up to 10% jitter
/// on top. Attempt 0 never waits.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let delay_ms = base_ms.saturating_mul(u64::from(attempt));
    let capped_delay = delay_ms.min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_linear() {
        let b1 = calculate_backoff(1, 1000, 10_000);
        assert!(b1.as_millis() >= 1000 && b1.as_millis() < 1100);

        let b2 = calculate_backoff(2, 1000, 10_000);
        assert!(b2.as_millis() >= 2000 && b2.as_millis() < 2200);

        let b3 = calculate_backoff(3, 1000, 10_000);
        assert!(b3.as_millis() >= 3000 && b3.as_millis() < 3300);
    }

    #[test]
    fn test_backoff_cap_and_zero() {
        assert_eq!(calculate_backoff(0, 1000, 10_000), Duration::ZERO);

        let capped = calculate_backoff(50, 1000, 5000);
        assert!(capped.as_millis() >= 5000 && capped.as_millis() < 5500);
    }
}
