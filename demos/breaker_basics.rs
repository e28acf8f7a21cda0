// Trip a circuit breaker, watch it recover through half-open.
//
// cargo run --example breaker_basics

use std::time::Duration;

use resilience::{CircuitBreaker, ResilienceError};

#[tokio::main]
async fn main() -> Result<(), ResilienceError> {
    let breaker = CircuitBreaker::builder("demo-backend")
        .failure_threshold(2)
        .reset_timeout(Duration::from_millis(500))
        .on_open(|| println!("-> breaker opened"))
        .on_close(|| println!("-> breaker closed"))
        .build()?;

    // Two failures trip the breaker.
    for attempt in 1..=2 {
        let result: Result<(), _> = breaker
            .execute(|| async { Err(ResilienceError::network("backend unreachable")) })
            .await;
        println!("attempt {attempt}: {result:?} (state: {})", breaker.state());
    }

    // While open, calls fast-fail without reaching the operation.
    let result: Result<&str, _> = breaker.execute(|| async { Ok("never runs") }).await;
    println!("while open: {result:?}");

    // After the reset window a trial call is admitted and closes the breaker.
    tokio::time::sleep(Duration::from_millis(600)).await;
    let result = breaker
        .execute(|| async { Ok::<_, ResilienceError>("backend recovered") })
        .await;
    println!("trial call: {result:?} (state: {})", breaker.state());

    Ok(())
}
