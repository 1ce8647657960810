//! Sensor-to-wheel response.
//!
//! A reading becomes a forward drive through an exponential curve, and the
//! two drives are routed to the wheels either crosswise or same-side. The
//! crossing decides whether a vehicle turns toward or away from hot regions.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// `drive = gain * exp(reading - offset)`.
///
/// Strictly positive and strictly increasing in the reading for any finite
/// positive gain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivationCurve {
    pub gain: f64,
    pub offset: f64,
}

impl ActivationCurve {
    pub fn new(gain: f64, offset: f64) -> Self {
        Self { gain, offset }
    }

    /// `2 exp(r)`, used by the same-side demo.
    pub fn doubled() -> Self {
        Self::new(2.0, 0.0)
    }

    pub fn drive(&self, reading: f64) -> f64 {
        self.gain * (reading - self.offset).exp()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.gain.is_finite() && self.gain > 0.0) {
            return Err(ConfigError::activation(format!(
                "gain must be finite and positive, got {}",
                self.gain
            )));
        }
        if !self.offset.is_finite() {
            return Err(ConfigError::activation(format!(
                "offset must be finite, got {}",
                self.offset
            )));
        }
        Ok(())
    }
}

impl Default for ActivationCurve {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// How sensor drives are wired to the wheels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coupling {
    /// Left wheel from sensor 2, right wheel from sensor 1
    #[default]
    Crossed,
    /// Left wheel from sensor 1, right wheel from sensor 2
    Direct,
}

impl Coupling {
    /// Maps `(sensor 1 drive, sensor 2 drive)` to `(left, right)`.
    pub fn route(self, drive1: f64, drive2: f64) -> (f64, f64) {
        match self {
            Coupling::Crossed => (drive2, drive1),
            Coupling::Direct => (drive1, drive2),
        }
    }
}
