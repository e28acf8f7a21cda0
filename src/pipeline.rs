use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::circuit_breaker::CircuitBreaker;
use crate::combinators::{with_retry, RetryPolicy};
use crate::error::ResilienceError;

/// Composed resilience wrapper for one class of operations.
///
/// Nests the configured layers as `retry(breaker(timeout(op)))`: the timeout
/// bounds each individual attempt, the breaker sees every attempt's outcome,
/// and the retry policy decides whether another attempt is worth making.
/// A `CircuitOpen` rejection is terminal for the default classifier, so
/// retries stop hammering an open breaker on their own.
///
/// The breaker is injected by the owner and may be shared across pipelines
/// guarding the same downstream resource; the pipeline itself holds no other
/// state.
pub struct ResiliencePipeline {
    breaker: Option<Arc<CircuitBreaker>>,
    retry: Option<RetryPolicy>,
    timeout: Option<Duration>,
}

impl ResiliencePipeline {
    /// Create a new builder with no layers configured.
    pub fn builder() -> ResiliencePipelineBuilder {
        ResiliencePipelineBuilder::default()
    }

    /// Runs `operation` through every configured layer.
    ///
    /// The closure is called once per attempt to construct that attempt's
    /// future. On a breaker fast-fail the future is dropped unpolled, so an
    /// async operation's body never runs; synchronous work done inside the
    /// closure itself (before the future is returned) is not deferred.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ResilienceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ResilienceError>>,
    {
        match &self.retry {
            Some(policy) => {
                let this = self;
                with_retry(policy, move || {
                    let fut = operation();
                    this.attempt(fut)
                })
                .await
            }
            None => {
                let fut = operation();
                self.attempt(fut).await
            }
        }
    }

    /// One attempt: the operation future behind the breaker and timeout.
    async fn attempt<T, Fut>(&self, fut: Fut) -> Result<T, ResilienceError>
    where
        Fut: Future<Output = Result<T, ResilienceError>>,
    {
        match &self.breaker {
            Some(breaker) => {
                breaker
                    .execute(|| bounded(self.timeout, fut))
                    .await
            }
            None => bounded(self.timeout, fut).await,
        }
    }
}

async fn bounded<T, Fut>(timeout: Option<Duration>, fut: Fut) -> Result<T, ResilienceError>
where
    Fut: Future<Output = Result<T, ResilienceError>>,
{
    match timeout {
        Some(duration) => match tokio::time::timeout(duration, fut).await {
            Ok(result) => result,
            Err(_) => Err(ResilienceError::timeout(
                "operation did not complete in time",
                duration,
            )),
        },
        None => fut.await,
    }
}

/// Builder for [`ResiliencePipeline`].
#[derive(Default)]
pub struct ResiliencePipelineBuilder {
    breaker: Option<Arc<CircuitBreaker>>,
    retry: Option<RetryPolicy>,
    timeout: Option<Duration>,
}

impl ResiliencePipelineBuilder {
    /// Guards every attempt with the given shared breaker.
    pub fn circuit_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    /// Retries failed attempts according to `policy`.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Bounds each individual attempt by `duration`.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Validates the retry policy, if any, and builds the pipeline.
    pub fn build(self) -> Result<ResiliencePipeline, ResilienceError> {
        if let Some(policy) = &self.retry {
            policy.validate()?;
        }
        Ok(ResiliencePipeline {
            breaker: self.breaker,
            retry: self.retry,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
