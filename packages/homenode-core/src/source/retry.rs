//! Retry policy for bringing a content source online.
//!
//! Discovery of a media server keeps the historical blocking contract by
//! default: the caller waits until a server answers. A bounded policy gives up
//! after a number of attempts so tests and impatient deployments can move on
//! with an empty catalog.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Attempt budget and backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts before giving up. `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Delay after the first failed attempt.
    pub initial_backoff: Duration,
    /// Upper bound on the delay; backoff doubles until it reaches this.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Retries until the operation succeeds.
    pub fn unbounded(initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: None,
            initial_backoff,
            max_backoff,
        }
    }

    /// Gives up after `max_attempts` attempts (at least one is always made).
    pub fn bounded(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
            initial_backoff,
            max_backoff,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }

    fn exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt >= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded(Duration::from_millis(200), Duration::from_secs(5))
    }
}

/// Runs `operation` until it succeeds or the policy's budget is spent.
///
/// Returns the last error once a bounded policy gives up. With an unbounded
/// policy this only returns on success.
pub async fn retry_until_available<T, E, F, Fut>(
    label: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    log::info!("[Retry] {} succeeded after {} attempts", label, attempt);
                }
                return Ok(value);
            }
            Err(e) if policy.exhausted(attempt) => {
                log::warn!("[Retry] {} failed after {} attempts: {}", label, attempt, e);
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                log::warn!(
                    "[Retry] {} attempt {} failed: {} (next in {}ms)",
                    label,
                    attempt,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
