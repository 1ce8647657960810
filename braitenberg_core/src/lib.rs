//! Braitenberg Core - Heat-Field Vehicles
//!
//! Simple two-sensor vehicles wander over a precomputed scalar "heat" field:
//! 1. **Field**: seeded coherent noise sampled on an integer grid
//! 2. **Sampler**: total lookups with an explicit out-of-bounds policy
//! 3. **Vehicle**: exponential sensor response feeding a differential drive
//! 4. **Simulation**: synchronous, order-independent stepping of the population

pub mod activation;
pub mod error;
pub mod field;
pub mod sampler;
pub mod simulation;
pub mod vehicle;

// Re-export key types for convenience
pub use activation::{ActivationCurve, Coupling};
pub use error::ConfigError;
pub use field::{
    FieldConfig, FieldGenerator, FieldStats, GridPoint, NoiseKind, ScalarField, ValueMap,
};
pub use sampler::{FieldSampler, HeatSource, OutOfBounds};
pub use simulation::{advance, Simulation, SimulationConfig, Snapshot, StepReport};
pub use vehicle::{Activation, Pose, SensorPair, Vehicle, VehicleParams, VehicleState};
