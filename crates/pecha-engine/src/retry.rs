//! Fixed-delay retry for page fetchers.
//!
//! The orchestrator never retries. A fetcher that wants another attempt at
//! a page wraps its single-attempt routine in [`with_retry`].

use crate::config::RetryConfig;
use std::future::Future;
use std::time::Duration;

/// Decides whether the result of one attempt is worth another try.
pub trait Retryable {
    fn should_retry(&self) -> bool;
}

impl<T: Retryable, E> Retryable for Result<T, E> {
    fn should_retry(&self) -> bool {
        match self {
            Ok(value) => value.should_retry(),
            Err(_) => true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: config.delay(),
        }
    }
}

/// Run `operation` until it yields a result that should not be retried or
/// the attempts are exhausted. The closure receives the 1-based attempt
/// number. The last attempt's result is returned as is.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> T
where
    T: Retryable,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = T>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let result = operation(attempt).await;
        if attempt >= max_attempts || !result.should_retry() {
            if attempt > 1 {
                tracing::debug!("{} finished after {} attempts", label, attempt);
            }
            return result;
        }

        tracing::info!(
            "{} incomplete (attempt {}/{}), retrying in {:?}",
            label,
            attempt,
            max_attempts,
            policy.delay
        );
        tokio::time::sleep(policy.delay).await;
        attempt += 1;
    }
}
