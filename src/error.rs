use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

/// Error types that can occur when executing guarded operations.
#[derive(Debug, Error)]
pub enum ResilienceError {
    /// Component or resource initialization errors
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The requested feature is not available on this platform
    #[error("Platform not supported: {feature}")]
    PlatformNotSupported { feature: String },
    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Network request/response errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        status_code: Option<u16>,
        response_body: Option<String>,
    },
    /// Authentication and authorization errors
    #[error("Auth error: {0}")]
    Authentication(String),
    /// A guarded operation failed after its recovery strategy was exhausted
    #[error("Operation failed: {message}")]
    OperationFailed {
        message: String,
        #[source]
        cause: Box<ResilienceError>,
        trace: Option<String>,
    },
    /// The operation did not complete within its deadline
    #[error("Timeout after {duration:?}: {message}")]
    Timeout { message: String, duration: Duration },
    /// Input validation errors, with one message per offending field
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },
    /// Fast-fail rejection from an open circuit breaker
    #[error("Circuit open: {0}")]
    CircuitOpen(String),
}

impl ResilienceError {
    /// Wraps a cause in an `OperationFailed` error.
    pub fn operation_failed(message: impl Into<String>, cause: ResilienceError) -> Self {
        ResilienceError::OperationFailed {
            message: message.into(),
            cause: Box::new(cause),
            trace: None,
        }
    }

    /// Creates a network error without status or body details.
    pub fn network(message: impl Into<String>) -> Self {
        ResilienceError::Network {
            message: message.into(),
            status_code: None,
            response_body: None,
        }
    }

    /// Creates a timeout error for the given deadline.
    pub fn timeout(message: impl Into<String>, duration: Duration) -> Self {
        ResilienceError::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a validation error from per-field messages.
    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ResilienceError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    /// Whether this error is worth another attempt by default.
    ///
    /// Transient transport-level failures are; everything that reflects a
    /// caller mistake, a terminal verdict, or a breaker rejection is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ResilienceError::Network { .. } => true,
            ResilienceError::Timeout { .. } => true,
            ResilienceError::Initialization(_) => false,
            ResilienceError::PlatformNotSupported { .. } => false,
            ResilienceError::Configuration(_) => false,
            ResilienceError::Authentication(_) => false,
            ResilienceError::OperationFailed { .. } => false,
            ResilienceError::Validation { .. } => false,
            ResilienceError::CircuitOpen(_) => false,
        }
    }
}

/// Converts I/O errors into network errors
impl From<std::io::Error> for ResilienceError {
    fn from(err: std::io::Error) -> Self {
        ResilienceError::network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_failed_keeps_cause_chain() {
        let err = ResilienceError::operation_failed(
            "recovery exhausted",
            ResilienceError::network("connection refused"),
        );
        let source = std::error::Error::source(&err).expect("cause");
        assert!(source.to_string().contains("connection refused"));
    }

    #[test]
    fn retryable_split_matches_taxonomy() {
        assert!(ResilienceError::network("reset").is_retryable());
        assert!(ResilienceError::timeout("slow", Duration::from_millis(50)).is_retryable());
        assert!(!ResilienceError::Authentication("denied".to_string()).is_retryable());
        assert!(!ResilienceError::validation("bad input", HashMap::new()).is_retryable());
        assert!(!ResilienceError::CircuitOpen("llm".to_string()).is_retryable());
    }
}
