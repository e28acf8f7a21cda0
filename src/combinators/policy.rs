use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ResilienceError;

const DEFAULT_MAX_RETRIES: usize = 3;
const DEFAULT_INITIAL_DELAY_MS: u64 = 200;
const DEFAULT_MAX_DELAY_MS: u64 = 2_000;
const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;

/// Decides whether an error is eligible for another attempt.
pub type RetryPredicate = dyn Fn(&ResilienceError) -> bool + Send + Sync;

/// Observer called with the zero-based attempt index and the triggering
/// error before each retry wait.
pub type RetryObserver = dyn Fn(usize, &ResilienceError) + Send + Sync;

/// Observer for the backoff variant; also receives the computed next delay.
pub type BackoffObserver = dyn Fn(usize, &ResilienceError, Duration) + Send + Sync;

/// Configuration for retry and backoff behavior.
#[derive(Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt
    pub max_retries: usize,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound on any computed backoff delay
    pub max_delay: Duration,
    /// Geometric growth factor for exponential backoff
    pub backoff_factor: f64,
    /// Whether plain retry grows its delay instead of keeping it fixed
    pub use_exponential_backoff: bool,
    retry_if: Option<Arc<RetryPredicate>>,
    on_retry: Option<Arc<RetryObserver>>,
    on_backoff: Option<Arc<BackoffObserver>>,
}

impl RetryPolicy {
    /// Creates a default policy with sane values.
    pub fn defaults() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            use_exponential_backoff: false,
            retry_if: None,
            on_retry: None,
            on_backoff: None,
        }
    }

    /// Aggressive preset for critical call paths: more attempts, short delays.
    pub fn aggressive() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(500),
            backoff_factor: 1.5,
            ..Self::defaults()
        }
    }

    /// Conservative preset: a single retry after a longer pause.
    pub fn conservative() -> Self {
        Self {
            max_retries: 1,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            ..Self::defaults()
        }
    }

    /// Sets the maximum number of retries after the initial attempt.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the upper bound on computed delays.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the geometric growth factor.
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Makes plain retry use the exponential delay schedule.
    pub fn exponential(mut self, enable: bool) -> Self {
        self.use_exponential_backoff = enable;
        self
    }

    /// Replaces the default retryability classifier.
    pub fn retry_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ResilienceError) -> bool + Send + Sync + 'static,
    {
        self.retry_if = Some(Arc::new(predicate));
        self
    }

    /// Observer invoked before each retry wait.
    pub fn on_retry<F>(mut self, observer: F) -> Self
    where
        F: Fn(usize, &ResilienceError) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(observer));
        self
    }

    /// Observer invoked before each backoff wait, with the computed delay.
    pub fn on_backoff<F>(mut self, observer: F) -> Self
    where
        F: Fn(usize, &ResilienceError, Duration) + Send + Sync + 'static,
    {
        self.on_backoff = Some(Arc::new(observer));
        self
    }

    /// Checks that every field is within its accepted range.
    pub fn validate(&self) -> Result<(), ResilienceError> {
        if self.backoff_factor <= 1.0 {
            return Err(ResilienceError::Configuration(
                "backoff_factor must be greater than 1.0".to_string(),
            ));
        }
        if self.initial_delay > self.max_delay {
            return Err(ResilienceError::Configuration(
                "initial_delay cannot exceed max_delay".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the policy wants another attempt after `err`.
    pub(super) fn should_retry(&self, err: &ResilienceError) -> bool {
        match &self.retry_if {
            Some(predicate) => predicate(err),
            None => err.is_retryable(),
        }
    }

    /// Delay before retry `attempt` (zero-based) under the plain schedule.
    pub(super) fn delay_for_attempt(&self, attempt: usize) -> Duration {
        if self.use_exponential_backoff {
            self.backoff_delay_for_attempt(attempt)
        } else {
            self.initial_delay
        }
    }

    /// Delay before retry `attempt` under the exponential schedule:
    /// `min(initial_delay * backoff_factor^attempt, max_delay)`.
    pub(super) fn backoff_delay_for_attempt(&self, attempt: usize) -> Duration {
        let exponent = attempt.min(i32::MAX as usize) as i32;
        let factor = self.backoff_factor.powi(exponent);
        let scaled = self.initial_delay.as_secs_f64() * factor;
        // The geometric series overflows quickly; everything past the cap is
        // clamped to max_delay.
        if !scaled.is_finite() || scaled >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(scaled)
    }

    pub(super) fn notify_retry(&self, attempt: usize, err: &ResilienceError) {
        if let Some(observer) = &self.on_retry {
            observer(attempt, err);
        }
    }

    pub(super) fn notify_backoff(&self, attempt: usize, err: &ResilienceError, delay: Duration) {
        if let Some(observer) = &self.on_backoff {
            observer(attempt, err, delay);
        } else if let Some(observer) = &self.on_retry {
            observer(attempt, err);
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::defaults()
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("backoff_factor", &self.backoff_factor)
            .field("use_exponential_backoff", &self.use_exponential_backoff)
            .field("retry_if", &self.retry_if.as_ref().map(|_| "..."))
            .field("on_retry", &self.on_retry.as_ref().map(|_| "..."))
            .field("on_backoff", &self.on_backoff.as_ref().map(|_| "..."))
            .finish()
    }
}
