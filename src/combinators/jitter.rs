use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

use crate::error::ResilienceError;

/// Waits a random delay in `[0, base_delay]` before a single invocation.
///
/// Desynchronizes herds of concurrent callers retrying the same operation.
/// A failure is wrapped in [`ResilienceError::OperationFailed`].
pub async fn with_jitter<T, F, Fut>(base_delay: Duration, operation: F) -> Result<T, ResilienceError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ResilienceError>>,
{
    let max_millis = base_delay.as_millis() as u64;
    if max_millis > 0 {
        let jitter = rand::thread_rng().gen_range(0..=max_millis);
        sleep(Duration::from_millis(jitter)).await;
    }
    operation().await.map_err(|err| {
        ResilienceError::operation_failed("operation failed after jittered start", err)
    })
}
