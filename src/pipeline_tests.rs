use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use super::ResiliencePipeline;
use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use crate::combinators::RetryPolicy;
use crate::error::ResilienceError;

fn quick_retry(max_retries: usize) -> RetryPolicy {
    RetryPolicy::defaults()
        .max_retries(max_retries)
        .initial_delay(Duration::from_millis(1))
}

fn breaker(failure_threshold: u32) -> Arc<CircuitBreaker> {
    Arc::new(
        CircuitBreaker::new(
            "pipeline",
            CircuitBreakerConfig {
                failure_threshold,
                success_threshold: 1,
                reset_timeout: Duration::from_millis(50),
            },
        )
        .unwrap(),
    )
}

#[tokio::test]
async fn bare_pipeline_passes_results_through() {
    let pipeline = ResiliencePipeline::builder().build().unwrap();
    let result = pipeline.run(|| async { Ok("plain") }).await;
    assert_eq!(result.unwrap(), "plain");
}

#[tokio::test]
async fn retry_layer_recovers_from_transient_failures() {
    let pipeline = ResiliencePipeline::builder()
        .retry(quick_retry(3))
        .build()
        .unwrap();

    let calls = AtomicU32::new(0);
    let calls_ref = &calls;
    let result = pipeline
        .run(move || async move {
            let n = calls_ref.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(ResilienceError::network("flaky"))
            } else {
                Ok("recovered")
            }
        })
        .await;

    assert_eq!(result.unwrap(), "recovered");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn timeout_layer_bounds_each_attempt() {
    let pipeline = ResiliencePipeline::builder()
        .timeout(Duration::from_millis(20))
        .build()
        .unwrap();

    let result: Result<(), _> = pipeline
        .run(|| async {
            sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;

    assert!(matches!(result, Err(ResilienceError::Timeout { .. })));
}

#[tokio::test]
async fn breaker_sees_every_attempt_and_trips() {
    let breaker = breaker(3);
    let pipeline = ResiliencePipeline::builder()
        .circuit_breaker(Arc::clone(&breaker))
        .retry(quick_retry(5))
        .build()
        .unwrap();

    let calls = AtomicU32::new(0);
    let calls_ref = &calls;
    let result: Result<(), _> = pipeline
        .run(move || async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Err(ResilienceError::network("down hard"))
        })
        .await;

    assert!(result.is_err());
    assert_eq!(breaker.state(), CircuitState::Open);
    // Three real attempts trip the breaker; the fourth is a CircuitOpen
    // fast-fail, which the default classifier treats as terminal.
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn open_breaker_short_circuits_later_runs() {
    let breaker = breaker(1);
    let pipeline = ResiliencePipeline::builder()
        .circuit_breaker(Arc::clone(&breaker))
        .build()
        .unwrap();

    let _: Result<(), _> = pipeline
        .run(|| async { Err(ResilienceError::network("down")) })
        .await;
    assert_eq!(breaker.state(), CircuitState::Open);

    let calls = AtomicU32::new(0);
    let calls_ref = &calls;
    let result: Result<(), _> = pipeline
        .run(move || async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

    assert!(matches!(result, Err(ResilienceError::CircuitOpen(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn full_stack_recovers_after_reset_window() {
    let breaker = breaker(1);
    let pipeline = ResiliencePipeline::builder()
        .circuit_breaker(Arc::clone(&breaker))
        .retry(quick_retry(2))
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let _: Result<(), _> = pipeline
        .run(|| async { Err(ResilienceError::network("down")) })
        .await;
    assert_eq!(breaker.state(), CircuitState::Open);

    sleep(Duration::from_millis(60)).await;

    let result = pipeline.run(|| async { Ok("back") }).await;
    assert_eq!(result.unwrap(), "back");
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[tokio::test]
async fn builder_rejects_invalid_retry_policy() {
    let err = ResiliencePipeline::builder()
        .retry(RetryPolicy::defaults().backoff_factor(0.5))
        .build();
    assert!(matches!(err, Err(ResilienceError::Configuration(_))));
}
