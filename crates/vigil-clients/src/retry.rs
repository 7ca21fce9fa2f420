use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::Result;

// ─── RetryPolicy ──────────────────────────────────────────────────────────

/// Bounded retry with exponential backoff and full jitter.
///
/// `max_attempts` counts the first try, so `1` disables retries. A value of
/// `0` is treated as `1`: every call is attempted at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// A policy that tries exactly once.
    pub const fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Sleep before retry number `attempt` (1 = first retry).
    ///
    /// Drawn uniformly from `0..=min(base * 2^(attempt-1), max)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let base_ms = self.base_delay.as_millis() as u64;
        let max_ms = self.max_delay.as_millis() as u64;
        let exponential = base_ms.saturating_mul(1_u64.checked_shl(attempt - 1).unwrap_or(u64::MAX));
        let capped = exponential.min(max_ms);
        if capped == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=capped))
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Drive `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.attempts();
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts && err.is_retryable() => {
                    let delay = self.delay_for_attempt(attempt);
                    tracing::warn!(
                        call = label,
                        attempt,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient collaborator failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
