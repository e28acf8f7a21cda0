use std::fmt;

/// State of a circuit breaker.
///
/// The machine cycles indefinitely: `Closed` until consecutive failures reach
/// the threshold, `Open` until the reset window elapses, `HalfOpen` while
/// trial calls probe recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, calls pass through
    Closed,
    /// Calls are rejected without reaching the guarded operation
    Open,
    /// Probing recovery with a bounded number of trial calls
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        };
        write!(f, "{name}")
    }
}
