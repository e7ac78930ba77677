//! Bounded retry around a single remote call.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use pipeline::RetryPolicy;
use tracing::warn;

/// How often a fatal-tier remote call is attempted.
///
/// The default is a single attempt: a failed search or model call fails the
/// run immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first. `0` is treated as `1`.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for every further attempt.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    /// Back-off before attempt `failed_attempt + 1`.
    fn backoff(&self, failed_attempt: u32) -> Duration {
        let factor = 1u32 << failed_attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor)
    }
}

/// Runs `call` until it succeeds, returns a non-retryable error, or the
/// attempt budget is spent. A provider's `after` hint is honoured when it is
/// longer than the computed back-off.
pub(crate) async fn with_retry<T, E, F, Fut>(
    config: &RetryConfig,
    operation: &'static str,
    policy: impl Fn(&E) -> RetryPolicy,
    mut call: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let err = match call().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let RetryPolicy::Retryable { after } = policy(&err) else {
            return Err(err);
        };
        if attempt >= max_attempts {
            return Err(err);
        }

        let delay = config.backoff(attempt).max(after.unwrap_or_default());
        warn!(
            operation,
            attempt,
            max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "remote call failed, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
