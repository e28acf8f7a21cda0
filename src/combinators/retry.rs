use std::future::Future;

use tokio::time::sleep;

use crate::error::ResilienceError;

use super::policy::RetryPolicy;

/// Invokes `operation` up to `max_retries + 1` times.
///
/// An error the policy's predicate rejects stops the attempt sequence
/// immediately and surfaces as [`ResilienceError::OperationFailed`]. Between
/// attempts the task sleeps for `initial_delay` (or the exponential schedule
/// when the policy opts into it), calling `on_retry` before each wait. On
/// exhaustion the last error is wrapped in `OperationFailed`.
///
/// Programmer errors (panics) are not caught here; they abort the attempt
/// sequence unmodified without a retry.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, ResilienceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ResilienceError>>,
{
    let mut attempt = 0usize;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !policy.should_retry(&err) {
                    return Err(ResilienceError::operation_failed(
                        "operation failed with a non-retryable error",
                        err,
                    ));
                }
                if attempt >= policy.max_retries {
                    return Err(ResilienceError::operation_failed(
                        format!(
                            "retry attempts exhausted after {} tries",
                            policy.max_retries + 1
                        ),
                        err,
                    ));
                }
                policy.notify_retry(attempt, &err);
                let delay = policy.delay_for_attempt(attempt);
                log::debug!("retrying after {delay:?} (attempt {attempt}): {err}");
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Like [`with_retry`], but the delay before retry *k* is
/// `min(initial_delay * backoff_factor^k, max_delay)`.
///
/// The policy's backoff observer receives the computed delay before each
/// wait.
pub async fn with_exponential_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, ResilienceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ResilienceError>>,
{
    let mut attempt = 0usize;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !policy.should_retry(&err) {
                    return Err(ResilienceError::operation_failed(
                        "operation failed with a non-retryable error",
                        err,
                    ));
                }
                if attempt >= policy.max_retries {
                    return Err(ResilienceError::operation_failed(
                        format!(
                            "retry attempts exhausted after {} tries",
                            policy.max_retries + 1
                        ),
                        err,
                    ));
                }
                let delay = policy.backoff_delay_for_attempt(attempt);
                policy.notify_backoff(attempt, &err, delay);
                log::debug!("backing off {delay:?} (attempt {attempt}): {err}");
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
