//! Retry with exponential backoff for RPC calls.
//!
//! Only transient failures are retried: connection errors, timeouts and 5xx
//! responses. JSON-RPC errors and undecodable bodies are returned at once.

use std::time::Duration;

use crate::error::RpcError;

/// How transient failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first.
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Never retry.
    pub const NONE: Self = Self {
        max_retries: 0,
        base_delay: Duration::ZERO,
    };

    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    /// Delays: 200ms, 400ms, 800ms.
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

/// Runs `f` up to `max_retries + 1` times while it fails transiently.
pub(crate) async fn retry<F, Fut, T>(
    policy: &RetryPolicy,
    method: &'static str,
    f: F,
) -> Result<T, RpcError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, RpcError>>,
{
    for attempt in 0..policy.max_retries {
        match f().await {
            Err(e) if e.is_transient() => {
                let delay = policy.delay(attempt);
                tracing::warn!(
                    method,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    "RPC request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }
    // Final attempt, no more retries.
    f().await
}
