//! Common types for the environment layer.

use crate::EnvError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Step cadence in ticks per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickRate(f64);

impl TickRate {
    /// Display refresh rate the stepping loop targets by default.
    pub const DEFAULT_HZ: f64 = 60.0;

    /// Creates a rate, rejecting zero, negative and non-finite values.
    pub fn new(hz: f64) -> Result<Self, EnvError> {
        if hz.is_finite() && hz > 0.0 {
            Ok(Self(hz))
        } else {
            Err(EnvError::InvalidRate(hz))
        }
    }

    pub fn hz(&self) -> f64 {
        self.0
    }

    /// Time between two ticks.
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.0)
    }

    /// Whole ticks that fit in `duration`.
    pub fn ticks_in(&self, duration: Duration) -> u64 {
        (duration.as_secs_f64() * self.0).floor() as u64
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self(Self::DEFAULT_HZ)
    }
}

impl std::fmt::Display for TickRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate() {
        let rate = TickRate::default();
        assert_eq!(rate.hz(), 60.0);
        let period = rate.period();
        assert!(period > Duration::from_millis(16) && period < Duration::from_millis(17));
    }

    #[test]
    fn test_ticks_in() {
        let rate = TickRate::new(10.0).unwrap();
        assert_eq!(rate.period(), Duration::from_millis(100));
        assert_eq!(rate.ticks_in(Duration::from_secs(2)), 20);
        assert_eq!(rate.ticks_in(Duration::from_millis(250)), 2);
    }

    #[test]
    fn test_invalid_rate() {
        assert!(TickRate::new(0.0).is_err());
        assert!(TickRate::new(-5.0).is_err());
        assert!(TickRate::new(f64::NAN).is_err());
    }
}
