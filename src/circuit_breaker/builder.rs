use std::sync::Arc;

use crate::error::ResilienceError;

use super::config::CircuitBreakerConfig;
use super::core::{CircuitBreaker, TransitionHook};

/// Builder for [`CircuitBreaker`] with optional transition hooks.
pub struct CircuitBreakerBuilder {
    name: String,
    config: CircuitBreakerConfig,
    on_open: Option<Arc<TransitionHook>>,
    on_close: Option<Arc<TransitionHook>>,
}

impl CircuitBreakerBuilder {
    pub(super) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: CircuitBreakerConfig::defaults(),
            on_open: None,
            on_close: None,
        }
    }

    /// Sets the full configuration at once.
    pub fn config(mut self, config: CircuitBreakerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how many consecutive failures open the breaker.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    /// Sets how many trial successes close the breaker again.
    pub fn success_threshold(mut self, threshold: u32) -> Self {
        self.config.success_threshold = threshold;
        self
    }

    /// Sets how long the breaker stays open before probing recovery.
    pub fn reset_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.reset_timeout = timeout;
        self
    }

    /// Hook fired exactly once on every transition into `Open`.
    pub fn on_open<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_open = Some(Arc::new(hook));
        self
    }

    /// Hook fired exactly once on every transition into `Closed`.
    pub fn on_close<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_close = Some(Arc::new(hook));
        self
    }

    /// Validates the configuration and builds the breaker.
    pub fn build(self) -> Result<CircuitBreaker, ResilienceError> {
        CircuitBreaker::with_hooks(self.name, self.config, self.on_open, self.on_close)
    }
}
