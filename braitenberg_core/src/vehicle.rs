//! Two-sensor differential-drive vehicle.
//!
//! Each tick is a `reset()` followed by one `activate(r1, r2)`:
//!
//! ```text
//!   reset:     (x0, y0, θ0) <- (x, y, θ),  sl = sr = 0
//!   activate:  sl += drive(left),  sr += drive(right)
//!              θ = (sr - sl) / wheel_distance + θ0
//!              d = (sl + sr) / 2
//!              (x, y) = (x0, y0) + d (cos θ, sin θ)
//! ```
//!
//! The position update is the straight-chord approximation of differential
//! drive, valid for small per-tick displacement.

use crate::activation::{ActivationCurve, Coupling};
use crate::error::{require_positive, ConfigError};
use crate::field::GridPoint;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_3;
use tracing::warn;

/// Angle between the heading and each sensor.
pub const SENSOR_BEARING: f64 = FRAC_PI_3;

/// Sensors sit this far inside the body radius.
pub const SENSOR_INSET: f64 = 2.0;

/// Substituted for a NaN or infinite sensor reading.
pub const NEUTRAL_READING: f64 = 0.0;

/// Position and heading (radians, screen axes).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.theta.is_finite()
    }
}

/// Fixed per-vehicle constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// Body radius; sensors sit at `size - SENSOR_INSET` from the centre
    pub size: f64,

    /// Differential-drive wheel separation
    pub wheel_distance: f64,

    /// Reading-to-drive response
    pub activation: ActivationCurve,

    /// Sensor-to-wheel wiring
    pub coupling: Coupling,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            size: 10.0,
            wheel_distance: 7.0,
            activation: ActivationCurve::default(),
            coupling: Coupling::Crossed,
        }
    }
}

impl VehicleParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive(self.size, ConfigError::InvalidSize)?;
        require_positive(self.wheel_distance, ConfigError::InvalidWheelDistance)?;
        self.activation.validate()
    }

    /// Distance from the body centre to each sensor.
    pub fn sensor_reach(&self) -> f64 {
        self.size - SENSOR_INSET
    }
}

/// Grid cells probed by the two sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorPair {
    /// At `-SENSOR_BEARING`
    pub first: GridPoint,
    /// At `+SENSOR_BEARING`
    pub second: GridPoint,
}

/// How an `activate` call went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Nominal,
    /// A non-finite reading was replaced by [`NEUTRAL_READING`]
    Sanitized,
    /// The new pose was not finite; the reference pose was kept
    Restored,
}

/// What a renderer needs to draw a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    /// Pose at the start of the current tick (x0, y0, θ0)
    reference: Pose,
    /// Pose after the drive accumulated this tick
    pose: Pose,
    /// Accumulated left / right wheel displacement
    sl: f64,
    sr: f64,
    params: VehicleParams,
}

impl Vehicle {
    /// Creates a stationary vehicle with zero accumulated drive.
    pub fn new(pose: Pose, params: VehicleParams) -> Result<Self, ConfigError> {
        params.validate()?;
        if !pose.is_finite() {
            return Err(ConfigError::NonFinitePose {
                x: pose.x,
                y: pose.y,
                theta: pose.theta,
            });
        }
        Ok(Self {
            reference: pose,
            pose,
            sl: 0.0,
            sr: 0.0,
            params,
        })
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn reference(&self) -> Pose {
        self.reference
    }

    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    pub fn size(&self) -> f64 {
        self.params.size
    }

    pub fn wheel_distance(&self) -> f64 {
        self.params.wheel_distance
    }

    /// Accumulated `(sl, sr)` since the last reset.
    pub fn drive(&self) -> (f64, f64) {
        (self.sl, self.sr)
    }

    pub fn distance_travelled(&self) -> f64 {
        (self.sl + self.sr) / 2.0
    }

    pub fn heading(&self) -> f64 {
        (self.sr - self.sl) / self.params.wheel_distance + self.reference.theta
    }

    pub fn state(&self) -> VehicleState {
        VehicleState {
            x: self.pose.x,
            y: self.pose.y,
            theta: self.pose.theta,
            size: self.params.size,
        }
    }

    /// Cells under both sensors for the current pose.
    pub fn sensor_positions(&self) -> SensorPair {
        SensorPair {
            first: self.sensor_position(-SENSOR_BEARING),
            second: self.sensor_position(SENSOR_BEARING),
        }
    }

    fn sensor_position(&self, bearing: f64) -> GridPoint {
        let angle = self.pose.theta + bearing;
        let offset = Vector2::new(angle.cos(), angle.sin()) * self.params.sensor_reach();
        let p = self.pose.position() - offset;
        GridPoint::round(p.x, p.y)
    }

    /// Re-bases integration on the current pose.
    pub fn reset(&mut self) {
        self.reference = self.pose;
        self.sl = 0.0;
        self.sr = 0.0;
    }

    /// Feeds one pair of readings (sensor 1, sensor 2) through the drive.
    pub fn activate(&mut self, reading1: f64, reading2: f64) -> Activation {
        let mut outcome = Activation::Nominal;
        if !(reading1.is_finite() && reading2.is_finite()) {
            warn!(
                "Non-finite sensor readings ({}, {}); substituting {}",
                reading1, reading2, NEUTRAL_READING
            );
            outcome = Activation::Sanitized;
        }
        let sanitize = |reading: f64| {
            if reading.is_finite() {
                reading
            } else {
                NEUTRAL_READING
            }
        };
        let r1 = sanitize(reading1);
        let r2 = sanitize(reading2);

        let curve = self.params.activation;
        let (left, right) = self.params.coupling.route(curve.drive(r1), curve.drive(r2));
        self.sl += left;
        self.sr += right;

        let theta = self.heading();
        let distance = self.distance_travelled();
        self.pose = Pose {
            x: distance * theta.cos() + self.reference.x,
            y: distance * theta.sin() + self.reference.y,
            theta,
        };

        if !(self.pose.is_finite() && self.sl.is_finite() && self.sr.is_finite()) {
            warn!(
                "Non-finite pose after readings ({}, {}); restoring ({:.3}, {:.3}, {:.3})",
                reading1, reading2, self.reference.x, self.reference.y, self.reference.theta
            );
            self.pose = self.reference;
            self.sl = 0.0;
            self.sr = 0.0;
            return Activation::Restored;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::{span, Event, Level, Metadata, Subscriber};

    /// Counts WARN events emitted while installed.
    struct WarnCounter(Arc<AtomicUsize>);

    impl Subscriber for WarnCounter {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }
        fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
            span::Id::from_u64(1)
        }
        fn record(&self, _: &span::Id, _: &span::Record<'_>) {}
        fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}
        fn event(&self, event: &Event<'_>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
        fn enter(&self, _: &span::Id) {}
        fn exit(&self, _: &span::Id) {}
    }

    fn warnings_during(f: impl FnOnce()) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        tracing::subscriber::with_default(WarnCounter(Arc::clone(&count)), f);
        count.load(Ordering::SeqCst)
    }

    fn vehicle_at(x: f64, y: f64, theta: f64) -> Vehicle {
        Vehicle::new(Pose::new(x, y, theta), VehicleParams::default()).unwrap()
    }

    #[test]
    fn test_heading_law_from_rest() {
        let mut v = vehicle_at(0.0, 0.0, 0.0);
        let (r1, r2) = (0.3, -0.4);

        v.activate(r1, r2);

        let expected = ((r1 - 1.0f64).exp() - (r2 - 1.0f64).exp()) / 7.0;
        assert!((v.pose().theta - expected).abs() < 1e-9);
        assert_relative_eq!(v.heading(), v.pose().theta);
    }

    #[test]
    fn test_cross_coupling_feeds_opposite_wheels() {
        let mut v = vehicle_at(0.0, 0.0, 0.0);
        v.activate(1.0, 0.0);

        let (sl, sr) = v.drive();
        assert_relative_eq!(sr, 1.0);
        assert_relative_eq!(sl, (-1.0f64).exp());
        // Hotter sensor 1 spins the right wheel faster: turn toward +theta
        assert!(v.pose().theta > 0.0);
    }

    #[test]
    fn test_direct_coupling_mirrors_turn() {
        let params = VehicleParams {
            coupling: Coupling::Direct,
            ..Default::default()
        };
        let mut v = Vehicle::new(Pose::default(), params).unwrap();
        v.activate(1.0, 0.0);

        assert!(v.pose().theta < 0.0);
    }

    #[test]
    fn test_position_follows_mean_displacement() {
        let mut v = vehicle_at(10.0, 20.0, 0.5);
        v.activate(1.0, 1.0);

        // Equal drives: heading unchanged, distance = 1
        assert_relative_eq!(v.pose().theta, 0.5);
        assert_relative_eq!(v.pose().x, 10.0 + 0.5f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(v.pose().y, 20.0 + 0.5f64.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_activate_accumulates_until_reset() {
        let mut v = vehicle_at(0.0, 0.0, 0.0);
        v.activate(1.0, 1.0);
        v.activate(1.0, 1.0);
        assert_relative_eq!(v.distance_travelled(), 2.0);
        assert_relative_eq!(v.pose().x, 2.0);

        v.reset();
        assert_eq!(v.drive(), (0.0, 0.0));
        assert_eq!(v.reference(), v.pose());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut v = vehicle_at(5.0, 5.0, 1.0);
        v.activate(0.2, 0.9);

        v.reset();
        let reference = v.reference();
        v.reset();

        assert_eq!(v.reference(), reference);
        assert_eq!(v.drive(), (0.0, 0.0));
    }

    #[test]
    fn test_sensor_geometry_at_zero_heading() {
        let v = vehicle_at(50.0, 50.0, 0.0);
        let sensors = v.sensor_positions();

        // round(x - 4, y + 6.93) and round(x - 4, y - 6.93)
        assert_eq!(sensors.first, GridPoint::new(46, 57));
        assert_eq!(sensors.second, GridPoint::new(46, 43));
    }

    #[test]
    fn test_sensors_symmetric_about_heading() {
        let v = vehicle_at(200.0, 300.0, std::f64::consts::FRAC_PI_2);
        let sensors = v.sensor_positions();

        // Heading +y: sensors mirror across the vertical axis through x
        assert_eq!(sensors.first.y, sensors.second.y);
        assert_eq!(sensors.first.x - 200, 200 - sensors.second.x);
    }

    #[test]
    fn test_non_finite_reading_is_sanitized() {
        let mut v = vehicle_at(0.0, 0.0, 0.0);
        let outcome = v.activate(f64::NAN, 1.0);

        assert_eq!(outcome, Activation::Sanitized);
        assert!(v.pose().is_finite());
        let (_, sr) = v.drive();
        assert_relative_eq!(sr, (NEUTRAL_READING - 1.0).exp());
    }

    #[test]
    fn test_sanitized_reading_is_logged() {
        let mut v = vehicle_at(0.0, 0.0, 0.0);

        let warned = warnings_during(|| {
            assert_eq!(v.activate(f64::INFINITY, f64::NAN), Activation::Sanitized);
        });
        assert_eq!(warned, 1);

        v.reset();
        let quiet = warnings_during(|| {
            assert_eq!(v.activate(0.2, 0.1), Activation::Nominal);
        });
        assert_eq!(quiet, 0);
    }

    #[test]
    fn test_overflowing_drive_restores_reference() {
        let mut v = vehicle_at(3.0, 4.0, 0.25);
        let outcome = v.activate(1.0e4, 0.0);

        assert_eq!(outcome, Activation::Restored);
        assert_eq!(v.pose(), Pose::new(3.0, 4.0, 0.25));
        assert_eq!(v.drive(), (0.0, 0.0));
    }

    #[test]
    fn test_new_rejects_invalid_input() {
        let bad_wheels = VehicleParams {
            wheel_distance: 0.0,
            ..Default::default()
        };
        assert_eq!(
            Vehicle::new(Pose::default(), bad_wheels),
            Err(ConfigError::InvalidWheelDistance(0.0))
        );
        assert!(Vehicle::new(Pose::new(f64::NAN, 0.0, 0.0), VehicleParams::default()).is_err());
    }
}
