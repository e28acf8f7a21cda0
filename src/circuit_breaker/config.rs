use std::time::Duration;

use crate::error::ResilienceError;

const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
const DEFAULT_SUCCESS_THRESHOLD: u32 = 1;
const DEFAULT_RESET_TIMEOUT_MS: u64 = 30_000;

/// Configuration for a circuit breaker.
#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures in `Closed` before the breaker opens
    pub failure_threshold: u32,
    /// Consecutive trial successes in `HalfOpen` before the breaker closes
    pub success_threshold: u32,
    /// How long the breaker stays open before admitting a trial call
    pub reset_timeout: Duration,
}

impl CircuitBreakerConfig {
    /// Creates a default configuration with sane values.
    pub fn defaults() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            reset_timeout: Duration::from_millis(DEFAULT_RESET_TIMEOUT_MS),
        }
    }

    /// Checks that every field is within its accepted range.
    pub fn validate(&self) -> Result<(), ResilienceError> {
        if self.failure_threshold == 0 {
            return Err(ResilienceError::Configuration(
                "failure_threshold must be at least 1".to_string(),
            ));
        }
        if self.success_threshold == 0 {
            return Err(ResilienceError::Configuration(
                "success_threshold must be at least 1".to_string(),
            ));
        }
        if self.reset_timeout.is_zero() {
            return Err(ResilienceError::Configuration(
                "reset_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::defaults()
    }
}
