use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::time::sleep;

use super::{with_timeout, with_timeout_or};
use crate::error::ResilienceError;

#[tokio::test]
async fn slow_operation_times_out_with_its_deadline() {
    let result: Result<(), _> = with_timeout(Duration::from_millis(50), || async {
        sleep(Duration::from_millis(200)).await;
        Ok(())
    })
    .await;

    match result {
        Err(ResilienceError::Timeout { duration, .. }) => {
            assert_eq!(duration, Duration::from_millis(50));
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn fast_operation_returns_its_result() {
    let result = with_timeout(Duration::from_millis(200), || async {
        sleep(Duration::from_millis(10)).await;
        Ok("fast")
    })
    .await;
    assert_eq!(result.unwrap(), "fast");
}

#[tokio::test]
async fn operation_errors_pass_through_before_the_deadline() {
    let result: Result<(), _> = with_timeout(Duration::from_millis(200), || async {
        Err(ResilienceError::network("refused"))
    })
    .await;
    assert!(matches!(result, Err(ResilienceError::Network { .. })));
}

#[tokio::test]
async fn timeout_fallback_supplies_the_result() {
    let fallback_calls = AtomicU32::new(0);
    let fallback_ref = &fallback_calls;

    let result = with_timeout_or(
        Duration::from_millis(20),
        || async {
            sleep(Duration::from_millis(200)).await;
            Ok("primary")
        },
        move || async move {
            fallback_ref.fetch_add(1, Ordering::SeqCst);
            Ok("stale cache")
        },
    )
    .await;

    assert_eq!(result.unwrap(), "stale cache");
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn timeout_fallback_not_invoked_when_operation_wins() {
    let fallback_calls = AtomicU32::new(0);
    let fallback_ref = &fallback_calls;

    let result = with_timeout_or(
        Duration::from_millis(200),
        || async { Ok(1) },
        move || async move {
            fallback_ref.fetch_add(1, Ordering::SeqCst);
            Ok(2)
        },
    )
    .await;

    assert_eq!(result.unwrap(), 1);
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
}
