use std::future::Future;

use crate::error::ResilienceError;

/// Runs `operation`; on failure runs `fallback` and returns its result.
///
/// If the fallback fails too, the result is
/// [`ResilienceError::OperationFailed`] with the fallback's error as cause.
pub async fn with_fallback<T, F, Fut, G, FbFut>(
    operation: F,
    fallback: G,
) -> Result<T, ResilienceError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ResilienceError>>,
    G: FnOnce() -> FbFut,
    FbFut: Future<Output = Result<T, ResilienceError>>,
{
    match operation().await {
        Ok(value) => Ok(value),
        Err(primary) => {
            log::debug!("primary operation failed, running fallback: {primary}");
            match fallback().await {
                Ok(value) => Ok(value),
                Err(secondary) => Err(ResilienceError::operation_failed(
                    format!("fallback failed after primary error: {primary}"),
                    secondary,
                )),
            }
        }
    }
}

/// Runs `operation`; on failure runs a best-effort compensating action
/// before surfacing the wrapped error.
///
/// A failing compensation is logged and never masks or replaces the
/// original error.
pub async fn with_compensation<T, F, Fut, C, CFut>(
    operation: F,
    compensate: C,
) -> Result<T, ResilienceError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ResilienceError>>,
    C: FnOnce() -> CFut,
    CFut: Future<Output = Result<(), ResilienceError>>,
{
    match operation().await {
        Ok(value) => Ok(value),
        Err(err) => {
            if let Err(comp_err) = compensate().await {
                log::warn!("compensating action failed: {comp_err}");
            }
            Err(ResilienceError::operation_failed(
                "operation failed, compensation attempted",
                err,
            ))
        }
    }
}

#[cfg(test)]
#[path = "fallback_tests.rs"]
mod tests;
