//! Retry of transient backend failures.
//!
//! Only idempotent requests are retried. A POST that fails with a 5xx may
//! already have been applied, so it is sent once and the error returned.

use std::future::Future;
use std::time::Duration;

use reqwest::Method;

use crate::error::ApiError;

const MAX_DELAY: Duration = Duration::from_secs(30);

/// Retry budget and exponential back-off for one client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    max_retries: u32,
    backoff_base_ms: u64,
}

impl RetryPolicy {
    pub(crate) fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
        }
    }

    /// Extra attempts allowed for a request sent with `method`.
    pub(crate) fn budget_for(&self, method: &Method) -> u32 {
        if method.is_idempotent() {
            self.max_retries
        } else {
            0
        }
    }

    /// Undithered wait before retry number `retry` (1-based): the base doubled
    /// per retry, capped.
    fn base_delay(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor)).min(MAX_DELAY)
    }

    /// [`RetryPolicy::base_delay`] with ±25 % jitter.
    fn delay(&self, retry: u32) -> Duration {
        self.base_delay(retry)
            .mul_f64(rand::random_range(0.75..1.25))
    }
}

/// Sends a request built by `send`, retrying transient failures within the
/// budget `policy` grants for `method`.
pub(crate) async fn send_with_retry<T, F, Fut>(
    policy: RetryPolicy,
    method: &Method,
    mut send: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let budget = policy.budget_for(method);
    let mut retry = 0u32;
    loop {
        let err = match send().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retry >= budget || !err.is_transient() {
            return Err(err);
        }

        retry += 1;
        let delay = policy.delay(retry);
        tracing::warn!(
            %method,
            retry,
            budget,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient backend error, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
