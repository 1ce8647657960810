//! The simulation: one heat field, a fixed population of vehicles, and a
//! synchronous `step()`.
//!
//! Every tick each vehicle, in insertion order, samples the field under both
//! sensors from its current pose, resets its integration reference and
//! activates. Vehicles never read one another, so the result of a tick does not
//! depend on the update order.

use crate::error::ConfigError;
use crate::field::{FieldConfig, FieldGenerator, ScalarField};
use crate::sampler::{FieldSampler, HeatSource, OutOfBounds};
use crate::vehicle::{Activation, Pose, Vehicle, VehicleParams, VehicleState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Everything needed to build a [`Simulation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Master seed for the field and vehicle placement
    pub seed: u64,

    /// Heat field shape
    pub field: FieldConfig,

    /// Number of vehicles to place
    pub vehicle_count: usize,

    /// Constants shared by every placed vehicle
    pub vehicle: VehicleParams,

    /// Sensor readings outside the grid
    pub out_of_bounds: OutOfBounds,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            field: FieldConfig::default(),
            vehicle_count: 10,
            vehicle: VehicleParams::default(),
            out_of_bounds: OutOfBounds::Clamp,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.field.validate()?;
        if self.vehicle_count == 0 {
            return Err(ConfigError::NoVehicles);
        }
        self.vehicle.validate()
    }

    /// Noise seed, derived so that placement changes never move the field.
    pub fn field_seed(&self) -> u32 {
        (self.seed.wrapping_mul(0x9e3779b97f4a7c15) >> 32) as u32
    }

    pub fn placement_seed(&self) -> u64 {
        self.seed.wrapping_mul(0x517cc1b727220a95)
    }
}

/// Outcome counts for one or more ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StepReport {
    /// Tick number reached (1 after the first step)
    pub tick: u64,

    /// Vehicles that received at least one non-finite reading
    pub sanitized: usize,

    /// Vehicles held at their previous pose
    pub restored: usize,
}

impl StepReport {
    fn record(&mut self, outcome: Activation) {
        match outcome {
            Activation::Nominal => {}
            Activation::Sanitized => self.sanitized += 1,
            Activation::Restored => self.restored += 1,
        }
    }

    /// Adds another report's counts and keeps the later tick.
    pub fn merge(&mut self, other: StepReport) {
        self.tick = self.tick.max(other.tick);
        self.sanitized += other.sanitized;
        self.restored += other.restored;
    }
}

/// Renderer view of the whole population at one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub vehicles: Vec<VehicleState>,
}

/// Advances a single vehicle by one tick against `source`.
pub fn advance<S: HeatSource + ?Sized>(vehicle: &mut Vehicle, source: &S) -> Activation {
    let sensors = vehicle.sensor_positions();
    let reading1 = source.sample(sensors.first);
    let reading2 = source.sample(sensors.second);
    vehicle.reset();
    vehicle.activate(reading1, reading2)
}

#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    field: ScalarField,
    vehicles: Vec<Vehicle>,
    tick_count: u64,
}

impl Simulation {
    /// Generates the field and places `vehicle_count` vehicles at seeded
    /// random poses.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let vehicles = place_vehicles(&config)?;
        Self::with_vehicles(config, vehicles)
    }

    /// Generates the field and adopts an explicit population, in order.
    ///
    /// `config.vehicle_count` and `config.vehicle` are replaced by what the
    /// given vehicles carry.
    pub fn with_vehicles(
        config: SimulationConfig,
        vehicles: Vec<Vehicle>,
    ) -> Result<Self, ConfigError> {
        if vehicles.is_empty() {
            return Err(ConfigError::NoVehicles);
        }
        config.field.validate()?;
        let field = FieldGenerator::generate_from(config.field_seed(), &config.field)?;
        Self::from_parts(config, field, vehicles)
    }

    /// Adopts a prebuilt field and population.
    pub fn from_parts(
        mut config: SimulationConfig,
        field: ScalarField,
        vehicles: Vec<Vehicle>,
    ) -> Result<Self, ConfigError> {
        let first = vehicles.first().ok_or(ConfigError::NoVehicles)?;
        config.vehicle = *first.params();
        config.vehicle_count = vehicles.len();
        config.field.width = field.width();
        config.field.height = field.height();

        debug!(
            "Simulation ready: {} vehicles on {}x{} field (seed={})",
            vehicles.len(),
            field.width(),
            field.height(),
            config.seed
        );

        Ok(Self {
            config,
            field,
            vehicles,
            tick_count: 0,
        })
    }

    /// Advances every vehicle by exactly one tick.
    pub fn step(&mut self) -> StepReport {
        let sampler = FieldSampler::new(&self.field, self.config.out_of_bounds);
        let mut report = StepReport {
            tick: self.tick_count + 1,
            ..Default::default()
        };

        #[cfg(not(feature = "parallel"))]
        for vehicle in &mut self.vehicles {
            report.record(advance(vehicle, &sampler));
        }

        #[cfg(feature = "parallel")]
        {
            let outcomes: Vec<Activation> = self
                .vehicles
                .par_iter_mut()
                .map(|vehicle| advance(vehicle, &sampler))
                .collect();
            for outcome in outcomes {
                report.record(outcome);
            }
        }

        self.tick_count += 1;
        report
    }

    /// Runs `ticks` steps and returns the summed report.
    pub fn run(&mut self, ticks: u64) -> StepReport {
        let mut total = StepReport {
            tick: self.tick_count,
            ..Default::default()
        };
        for _ in 0..ticks {
            total.merge(self.step());
        }
        total
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn field(&self) -> &ScalarField {
        &self.field
    }

    pub fn sampler(&self) -> FieldSampler<'_> {
        FieldSampler::new(&self.field, self.config.out_of_bounds)
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, index: usize) -> Option<&Vehicle> {
        self.vehicles.get(index)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn poses(&self) -> Vec<Pose> {
        self.vehicles.iter().map(Vehicle::pose).collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick_count,
            vehicles: self.vehicles.iter().map(Vehicle::state).collect(),
        }
    }
}

/// Heading first, then a corner offset by the body size, as the demo did.
fn place_vehicles(config: &SimulationConfig) -> Result<Vec<Vehicle>, ConfigError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.placement_seed());
    let size = config.vehicle.size;

    (0..config.vehicle_count)
        .map(|_| {
            let theta = rng.gen_range(0.0..4.0 * PI);
            let x = rng.gen_range(0..=config.field.width) as f64 - size;
            let y = rng.gen_range(0..=config.field.height) as f64 - size;
            Vehicle::new(Pose::new(x, y, theta), config.vehicle)
        })
        .collect()
}
