//! Timeout enforcement.
//!
//! Every outbound sink call runs under a deadline so a hung backend can only
//! ever cost one attempt, never stall the reporter loop.

use std::future::Future;
use std::time::Duration;

/// Marker returned when a deadline passes before the future completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineElapsed(pub Duration);

/// Run `fut` with a deadline.
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> Result<T, DeadlineElapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| DeadlineElapsed(deadline))
}
