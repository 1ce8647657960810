//! Error types for the environment layer.

use thiserror::Error;

/// Errors raised while driving a simulation on a clock.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The stepping task panicked or was cancelled
    #[error("Driver task failed: {0}")]
    TaskFailed(String),

    /// A holder of the shared simulation panicked
    #[error("Shared state poisoned: {0}")]
    Poisoned(String),

    /// Tick rate is zero or not finite
    #[error("Invalid tick rate: {0} Hz")]
    InvalidRate(f64),
}

impl EnvError {
    /// Creates a task failure error.
    pub fn task(msg: impl std::fmt::Display) -> Self {
        Self::TaskFailed(msg.to_string())
    }

    /// Creates a poisoned state error.
    pub fn poisoned(msg: impl std::fmt::Display) -> Self {
        Self::Poisoned(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        assert_eq!(
            EnvError::task("join failed").to_string(),
            "Driver task failed: join failed"
        );
        assert!(matches!(EnvError::poisoned("x"), EnvError::Poisoned(_)));
    }
}
