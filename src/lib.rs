//! A library for resilient operation execution.
//!
//! Two composable subsystems around one closed error taxonomy
//! ([`ResilienceError`]):
//!
//! - [`CircuitBreaker`]: a thread-safe closed/open/half-open state machine,
//!   owned and injected per operation class, that fast-fails callers while a
//!   failing dependency recovers.
//! - Combinators ([`with_retry`], [`with_exponential_backoff`],
//!   [`with_timeout`], [`with_fallback`], [`with_jitter`],
//!   [`with_compensation`], [`try_catch`], [`log_and_rethrow`]): stateless
//!   wrappers that add one recovery strategy each to an arbitrary fallible
//!   operation.
//!
//! The two compose by nesting, not by shared state; [`ResiliencePipeline`]
//! packages the common `retry(breaker(timeout(op)))` stack.
//!
//! ```no_run
//! use std::time::Duration;
//! use resilience::{CircuitBreaker, ResilienceError, with_retry, RetryPolicy};
//!
//! # async fn example() -> Result<(), ResilienceError> {
//! let breaker = CircuitBreaker::builder("payments")
//!     .failure_threshold(3)
//!     .reset_timeout(Duration::from_secs(30))
//!     .build()?;
//!
//! let policy = RetryPolicy::defaults().max_retries(2);
//! let charge = with_retry(&policy, || {
//!     breaker.execute(|| async { Ok::<_, ResilienceError>("charged") })
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod circuit_breaker;
pub mod combinators;
pub mod error;
pub mod pipeline;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerBuilder, CircuitBreakerConfig, CircuitState,
};
pub use combinators::{
    log_and_rethrow, try_catch, try_catch_or, with_compensation, with_exponential_backoff,
    with_fallback, with_jitter, with_retry, with_timeout, with_timeout_or, RetryPolicy,
};
pub use error::ResilienceError;
pub use pipeline::{ResiliencePipeline, ResiliencePipelineBuilder};

/// Initializes env-filtered logging for binaries and demos.
///
/// Safe to call more than once; later calls are ignored.
#[cfg(feature = "logging")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env().try_init();
}
