use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::error::ResilienceError;

use super::builder::CircuitBreakerBuilder;
use super::config::CircuitBreakerConfig;
use super::state::CircuitState;

pub(super) type TransitionHook = dyn Fn() + Send + Sync;

/// Mutable breaker state. Kept behind one lock so `state`, the counters and
/// the window timestamp are always observed as a single consistent snapshot.
struct Shared {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_state_change: Option<Instant>,
    trial_in_flight: bool,
}

/// Circuit breaker guarding one logical class of operations.
///
/// Starts `Closed`; consecutive failures reaching `failure_threshold` open
/// it. While `Open`, calls fast-fail with [`ResilienceError::CircuitOpen`]
/// without reaching the guarded operation. Once `reset_timeout` has elapsed
/// the next call is admitted as a single trial (`HalfOpen`); enough trial
/// successes close the breaker again, any trial failure re-opens it and
/// restarts the window.
///
/// The breaker is owned and injected by its caller; independent breakers
/// share no state and operate fully in parallel. Clone-free sharing goes
/// through `Arc<CircuitBreaker>`.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    shared: Mutex<Shared>,
    on_open: Option<Arc<TransitionHook>>,
    on_close: Option<Arc<TransitionHook>>,
}

impl CircuitBreaker {
    /// Creates a breaker with the given configuration and no hooks.
    pub fn new(
        name: impl Into<String>,
        config: CircuitBreakerConfig,
    ) -> Result<Self, ResilienceError> {
        Self::with_hooks(name.into(), config, None, None)
    }

    /// Create a new builder for a breaker with optional transition hooks.
    pub fn builder(name: impl Into<String>) -> CircuitBreakerBuilder {
        CircuitBreakerBuilder::new(name)
    }

    pub(super) fn with_hooks(
        name: String,
        config: CircuitBreakerConfig,
        on_open: Option<Arc<TransitionHook>>,
        on_close: Option<Arc<TransitionHook>>,
    ) -> Result<Self, ResilienceError> {
        config.validate()?;
        Ok(Self {
            name,
            config,
            shared: Mutex::new(Shared {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                last_state_change: None,
                trial_in_flight: false,
            }),
            on_open,
            on_close,
        })
    }

    /// Name used in diagnostics and log lines.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Consecutive failures recorded since the last transition to `Closed`.
    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    /// Consecutive trial successes recorded while `HalfOpen`.
    pub fn success_count(&self) -> u32 {
        self.lock().success_count
    }

    /// Whether a call would currently be admitted.
    ///
    /// Probing an `Open` breaker whose reset window has elapsed flips it to
    /// `HalfOpen`; the transition is evaluated lazily here and in
    /// [`execute`](Self::execute), never by a background timer.
    pub fn allow_request(&self) -> bool {
        let mut shared = self.lock();
        match shared.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => !shared.trial_in_flight,
            CircuitState::Open => {
                if self.reset_window_elapsed(&shared) {
                    self.enter_half_open(&mut shared);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Runs `operation` under the breaker.
    ///
    /// Fast-fails with [`ResilienceError::CircuitOpen`] while the breaker is
    /// open within its reset window; the operation is not invoked and no
    /// counter moves. Otherwise the operation runs, its outcome is recorded,
    /// and any failure is re-raised unmodified.
    ///
    /// While `HalfOpen` exactly one trial call is in flight at a time;
    /// concurrent callers fast-fail until the trial records its outcome.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<T, ResilienceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ResilienceError>>,
    {
        let trial = self.admit()?;
        // An abandoned trial (future dropped mid-flight) must release its
        // slot, or the breaker would fast-fail every later caller.
        let mut permit = TrialPermit {
            breaker: self,
            armed: trial,
        };
        let result = operation().await;
        permit.armed = false;
        match result {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(err) => {
                self.record_failure();
                Err(err)
            }
        }
    }

    /// Records a successful call.
    ///
    /// Clears the failure streak in `Closed`; while `HalfOpen`, counts toward
    /// `success_threshold` and closes the breaker once reached.
    pub fn record_success(&self) {
        let hook = {
            let mut shared = self.lock();
            shared.trial_in_flight = false;
            match shared.state {
                CircuitState::Closed => {
                    shared.failure_count = 0;
                    None
                }
                CircuitState::HalfOpen => {
                    shared.success_count += 1;
                    if shared.success_count >= self.config.success_threshold {
                        self.enter_closed(&mut shared)
                    } else {
                        None
                    }
                }
                // Late success from a call admitted before the breaker
                // tripped; the open window stays untouched.
                CircuitState::Open => None,
            }
        };
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Records a failed call.
    ///
    /// Counts toward `failure_threshold` in `Closed`; any failure while
    /// `HalfOpen` re-opens the breaker and restarts the reset window.
    /// Fast-fail rejections are not recorded here and never count.
    pub fn record_failure(&self) {
        let hook = {
            let mut shared = self.lock();
            shared.trial_in_flight = false;
            match shared.state {
                CircuitState::Closed => {
                    shared.failure_count += 1;
                    if shared.failure_count >= self.config.failure_threshold {
                        self.enter_open(&mut shared)
                    } else {
                        None
                    }
                }
                CircuitState::HalfOpen => {
                    shared.failure_count += 1;
                    self.enter_open(&mut shared)
                }
                // Late failure from a call admitted before the breaker
                // tripped; the open window stays untouched.
                CircuitState::Open => None,
            }
        };
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Unconditionally forces `Closed` and zeroes all counters.
    ///
    /// Operator escape hatch, not part of the automatic state machine.
    /// In-flight calls are not cancelled.
    pub fn reset(&self) {
        let hook = {
            let mut shared = self.lock();
            let was_closed = shared.state == CircuitState::Closed;
            shared.state = CircuitState::Closed;
            shared.failure_count = 0;
            shared.success_count = 0;
            shared.last_state_change = None;
            shared.trial_in_flight = false;
            if was_closed {
                None
            } else {
                log::info!("circuit breaker '{}' reset to closed", self.name);
                self.on_close.clone()
            }
        };
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Admission decision for one call. Claims the trial slot when entering
    /// or already in `HalfOpen`; returns whether this call is a trial.
    fn admit(&self) -> Result<bool, ResilienceError> {
        let mut shared = self.lock();
        match shared.state {
            CircuitState::Closed => Ok(false),
            CircuitState::HalfOpen => {
                if shared.trial_in_flight {
                    Err(self.rejection())
                } else {
                    shared.trial_in_flight = true;
                    Ok(true)
                }
            }
            CircuitState::Open => {
                if self.reset_window_elapsed(&shared) {
                    self.enter_half_open(&mut shared);
                    shared.trial_in_flight = true;
                    Ok(true)
                } else {
                    Err(self.rejection())
                }
            }
        }
    }

    fn rejection(&self) -> ResilienceError {
        ResilienceError::CircuitOpen(format!("circuit breaker '{}' is open", self.name))
    }

    fn reset_window_elapsed(&self, shared: &Shared) -> bool {
        match shared.last_state_change {
            Some(at) => at.elapsed() >= self.config.reset_timeout,
            None => true,
        }
    }

    fn enter_half_open(&self, shared: &mut Shared) {
        shared.state = CircuitState::HalfOpen;
        shared.success_count = 0;
        shared.trial_in_flight = false;
        log::info!("circuit breaker '{}' half-open, probing recovery", self.name);
    }

    fn enter_open(&self, shared: &mut Shared) -> Option<Arc<TransitionHook>> {
        shared.state = CircuitState::Open;
        shared.last_state_change = Some(Instant::now());
        log::warn!(
            "circuit breaker '{}' opened after {} consecutive failures",
            self.name,
            shared.failure_count
        );
        self.on_open.clone()
    }

    fn enter_closed(&self, shared: &mut Shared) -> Option<Arc<TransitionHook>> {
        shared.state = CircuitState::Closed;
        shared.failure_count = 0;
        shared.success_count = 0;
        log::info!("circuit breaker '{}' closed, normal operation resumed", self.name);
        self.on_close.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.lock();
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &shared.state)
            .field("failure_count", &shared.failure_count)
            .field("success_count", &shared.success_count)
            .field("config", &self.config)
            .finish()
    }
}

struct TrialPermit<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl Drop for TrialPermit<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.lock().trial_in_flight = false;
        }
    }
}

#[cfg(test)]
#[path = "core_tests.rs"]
mod tests;
