use std::future::Future;
use std::time::Duration;

use crate::error::ResilienceError;

/// Races `operation` against a timer.
///
/// Returns the operation's result if it completes first, otherwise
/// [`ResilienceError::Timeout`] carrying the deadline. The losing branch is
/// dropped; side effects it already started may still have happened.
pub async fn with_timeout<T, F, Fut>(duration: Duration, operation: F) -> Result<T, ResilienceError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ResilienceError>>,
{
    match tokio::time::timeout(duration, operation()).await {
        Ok(result) => result,
        Err(_) => Err(ResilienceError::timeout(
            "operation did not complete in time",
            duration,
        )),
    }
}

/// Like [`with_timeout`], but returns the fallback's result when the timer
/// wins instead of a timeout error.
pub async fn with_timeout_or<T, F, Fut, G, FbFut>(
    duration: Duration,
    operation: F,
    on_timeout: G,
) -> Result<T, ResilienceError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ResilienceError>>,
    G: FnOnce() -> FbFut,
    FbFut: Future<Output = Result<T, ResilienceError>>,
{
    match tokio::time::timeout(duration, operation()).await {
        Ok(result) => result,
        Err(_) => {
            log::debug!("operation timed out after {duration:?}, running timeout fallback");
            on_timeout().await
        }
    }
}

#[cfg(test)]
#[path = "timeout_tests.rs"]
mod tests;
