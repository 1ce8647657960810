//! Error types for building fields, vehicles and simulations.

use thiserror::Error;

/// Configuration rejected before any simulation state is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Field width or height is zero, or the grid is too large to allocate
    #[error("Invalid field dimensions: {width}x{height} (must be positive and allocatable)")]
    InvalidDimensions { width: usize, height: usize },

    /// Frequency divisor is zero, negative or not finite
    #[error("Invalid frequency divisor: {0} (must be finite and positive)")]
    InvalidFrequencyDivisor(f64),

    /// Wheel separation is zero, negative or not finite
    #[error("Invalid wheel distance: {0} (must be finite and positive)")]
    InvalidWheelDistance(f64),

    /// Vehicle size is zero, negative or not finite
    #[error("Invalid vehicle size: {0} (must be finite and positive)")]
    InvalidSize(f64),

    /// Activation curve cannot produce a finite positive drive
    #[error("Invalid activation curve: {0}")]
    InvalidActivation(String),

    /// Initial pose has a NaN or infinite component
    #[error("Initial pose must be finite, got ({x}, {y}, {theta})")]
    NonFinitePose { x: f64, y: f64, theta: f64 },

    /// Simulation asked for an empty population
    #[error("Vehicle count must be at least 1")]
    NoVehicles,

    /// Field values do not match the declared grid
    #[error("Field has {actual} values, expected {expected}")]
    FieldSizeMismatch { expected: usize, actual: usize },
}

impl ConfigError {
    /// Creates an activation error.
    pub fn activation(msg: impl Into<String>) -> Self {
        Self::InvalidActivation(msg.into())
    }
}

/// Returns `Ok(value)` when `value` is finite and strictly positive.
pub(crate) fn require_positive(
    value: f64,
    err: impl FnOnce(f64) -> ConfigError,
) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(err(value))
    }
}
