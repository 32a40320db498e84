//! Bounded retry for writes that hit a locked database

use std::future::Future;
use std::time::Duration;

use super::repository::{RepoError, RepoResult};

/// Total attempts, including the first
pub const MAX_ATTEMPTS: u32 = 5;

/// Delay before the second attempt; doubles on each retry
pub const BASE_DELAY: Duration = Duration::from_millis(50);

/// Run `op`, retrying only on [`RepoError::Busy`] with exponential backoff.
///
/// Gives up after [`MAX_ATTEMPTS`] and returns the last `Busy` error.
pub async fn with_busy_retry<T, F, Fut>(op_name: &str, mut op: F) -> RepoResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RepoResult<T>>,
{
    let mut attempt = 1;
    let mut delay = BASE_DELAY;
    loop {
        match op().await {
            Err(RepoError::Busy(msg)) if attempt < MAX_ATTEMPTS => {
                tracing::warn!(
                    op = op_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Database busy, retrying: {msg}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                delay *= 2;
            }
            Err(RepoError::Busy(msg)) => {
                tracing::error!(op = op_name, attempts = attempt, "Database still busy, giving up");
                return Err(RepoError::Busy(msg));
            }
            other => return other,
        }
    }
}
