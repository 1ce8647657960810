//! Named vehicle/field presets.

use crate::SimError;
use braitenberg_core::{
    ActivationCurve, Coupling, FieldConfig, SimulationConfig, ValueMap, VehicleParams,
};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// Cross-coupled "aggressor": turns toward the hotter side
    Crossed,

    /// Same-side wiring over the alpha-mapped field: turns away from heat
    Direct,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![ScenarioId::Crossed, ScenarioId::Direct]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Crossed => "crossed",
            ScenarioId::Direct => "direct",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Crossed => {
                "10 vehicles, crossed wiring, exp(r - 1), wheel distance 7, divisor 8"
            }
            ScenarioId::Direct => {
                "100 vehicles, same-side wiring, 2 exp(r), wheel distance 2, divisor 5, alpha field"
            }
        }
    }

    /// Full configuration for this scenario under `seed`.
    pub fn config(&self, seed: u64) -> SimulationConfig {
        match self {
            ScenarioId::Crossed => SimulationConfig {
                seed,
                vehicle_count: 10,
                ..Default::default()
            },
            ScenarioId::Direct => SimulationConfig {
                seed,
                field: FieldConfig {
                    frequency_divisor: 5.0,
                    value_map: ValueMap::alpha_channel(),
                    ..Default::default()
                },
                vehicle_count: 100,
                vehicle: VehicleParams {
                    size: 10.0,
                    wheel_distance: 2.0,
                    activation: ActivationCurve::doubled(),
                    coupling: Coupling::Direct,
                },
                ..Default::default()
            },
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crossed" | "aggressor" => Ok(ScenarioId::Crossed),
            "direct" | "same_side" | "coward" => Ok(ScenarioId::Direct),
            _ => Err(SimError::unknown_scenario(s)),
        }
    }
}
