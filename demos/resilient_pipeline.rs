// Wrap a flaky operation in the full retry + breaker + timeout stack.
//
// cargo run --example resilient_pipeline

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use resilience::{CircuitBreaker, ResilienceError, ResiliencePipeline, RetryPolicy};

#[tokio::main]
async fn main() -> Result<(), ResilienceError> {
    let breaker = Arc::new(
        CircuitBreaker::builder("flaky-service")
            .failure_threshold(5)
            .reset_timeout(Duration::from_secs(1))
            .build()?,
    );

    let pipeline = ResiliencePipeline::builder()
        .circuit_breaker(Arc::clone(&breaker))
        .retry(
            RetryPolicy::defaults()
                .max_retries(3)
                .initial_delay(Duration::from_millis(100))
                .on_retry(|attempt, err| println!("retry {attempt} after: {err}")),
        )
        .timeout(Duration::from_millis(250))
        .build()?;

    let calls = Arc::new(AtomicU32::new(0));
    let calls_op = Arc::clone(&calls);

    let answer = pipeline
        .run(move || {
            let calls = Arc::clone(&calls_op);
            async move {
                // Fails twice, then answers.
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ResilienceError::network("connection reset"))
                } else {
                    Ok(42)
                }
            }
        })
        .await?;

    println!(
        "answer: {answer} after {} calls (breaker: {})",
        calls.load(Ordering::SeqCst),
        breaker.state()
    );
    Ok(())
}
