use std::future::Future;

use crate::error::ResilienceError;

/// Runs a synchronous operation, wrapping any failure in
/// [`ResilienceError::OperationFailed`].
pub fn try_catch<T, F>(operation: F) -> Result<T, ResilienceError>
where
    F: FnOnce() -> Result<T, ResilienceError>,
{
    operation()
        .map_err(|err| ResilienceError::operation_failed("synchronous operation failed", err))
}

/// Runs a synchronous operation, substituting the handler's value on failure.
pub fn try_catch_or<T, F, H>(operation: F, handler: H) -> T
where
    F: FnOnce() -> Result<T, ResilienceError>,
    H: FnOnce(&ResilienceError) -> T,
{
    match operation() {
        Ok(value) => value,
        Err(err) => handler(&err),
    }
}

/// Runs `operation`, logging diagnostics on failure and re-raising the
/// original error unmodified.
///
/// The one combinator that does not normalize into `OperationFailed`; use it
/// to observe failures at a boundary without changing what callers see.
pub async fn log_and_rethrow<T, F, Fut>(context: &str, operation: F) -> Result<T, ResilienceError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ResilienceError>>,
{
    match operation().await {
        Ok(value) => Ok(value),
        Err(err) => {
            if let ResilienceError::OperationFailed {
                trace: Some(trace), ..
            } = &err
            {
                log::error!("{context}: {err}\n{trace}");
            } else {
                log::error!("{context}: {err}");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResilienceError;

    #[test]
    fn try_catch_wraps_failures() {
        let result: Result<(), _> =
            try_catch(|| Err(ResilienceError::Configuration("bad".to_string())));
        assert!(matches!(
            result,
            Err(ResilienceError::OperationFailed { .. })
        ));
    }

    #[test]
    fn try_catch_passes_values_through() {
        let result = try_catch(|| Ok(41));
        assert_eq!(result.unwrap(), 41);
    }

    #[test]
    fn try_catch_or_substitutes_on_failure() {
        let value = try_catch_or(
            || Err(ResilienceError::network("unreachable")),
            |_err| "substitute",
        );
        assert_eq!(value, "substitute");
    }

    #[tokio::test]
    async fn log_and_rethrow_returns_original_error() {
        let result: Result<(), _> = log_and_rethrow("loading profile", || async {
            Err(ResilienceError::Authentication("expired".to_string()))
        })
        .await;
        match result {
            Err(ResilienceError::Authentication(message)) => assert_eq!(message, "expired"),
            other => panic!("expected the original error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn log_and_rethrow_keeps_wrapped_errors_and_their_trace() {
        let result: Result<(), _> = log_and_rethrow("syncing", || async {
            Err(ResilienceError::OperationFailed {
                message: "sync failed".to_string(),
                cause: Box::new(ResilienceError::network("peer gone")),
                trace: Some("sync_loop -> flush -> send".to_string()),
            })
        })
        .await;
        match result {
            Err(ResilienceError::OperationFailed { trace, .. }) => {
                assert_eq!(trace.as_deref(), Some("sync_loop -> flush -> send"));
            }
            other => panic!("expected OperationFailed, got {other:?}"),
        }
    }
}
