//! Scenario runner - steps a simulation headlessly and scores the run.

use crate::exporter::{SimExport, SimFrame};
use crate::scenarios::ScenarioId;
use crate::SimError;

use braitenberg_core::{GridPoint, HeatSource, Simulation, SimulationConfig};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Scenario that was run ("custom" for a config file)
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Total ticks executed
    pub steps: u64,

    /// No pose had to be restored and every final pose is finite
    pub passed: bool,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,

    /// Recorded frames, when export was requested
    #[serde(skip)]
    pub export: Option<SimExport>,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioMetrics {
    /// Vehicle-ticks with at least one non-finite reading
    pub sanitized_readings: u64,

    /// Vehicle-ticks where the reference pose was kept
    pub restored_poses: u64,

    /// Average distance covered per vehicle
    pub mean_path_length: f64,

    /// Average sensor reading over every vehicle and tick
    pub mean_reading: f64,

    /// Share of vehicles whose final position is off the grid
    pub outside_fraction: f64,
}

#[derive(Debug, Clone, Copy)]
struct ExportOptions {
    every: u64,
    include_field: bool,
}

/// Runs scenarios headlessly.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Overrides the scenario's vehicle count
    vehicles: Option<usize>,

    /// Ticks to run
    steps: u64,

    export: Option<ExportOptions>,
}

impl ScenarioRunner {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            vehicles: None,
            steps: 600,
            export: None,
        }
    }

    pub fn with_vehicles(mut self, count: usize) -> Self {
        self.vehicles = Some(count);
        self
    }

    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    /// Records a frame every `every` ticks (and the initial one).
    pub fn with_export(mut self, every: u64, include_field: bool) -> Self {
        self.export = Some(ExportOptions {
            every: every.max(1),
            include_field,
        });
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Runs a preset scenario under this runner's seed.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        debug!("  {}", scenario.description());
        self.execute(scenario.name(), scenario.config(self.seed))
    }

    /// Runs an arbitrary configuration, keeping its own seed.
    pub fn run_config(&self, config: SimulationConfig) -> Result<ScenarioResult, SimError> {
        info!("Starting custom configuration (seed={})", config.seed);
        self.execute("custom", config)
    }

    fn execute(
        &self,
        name: &str,
        mut config: SimulationConfig,
    ) -> Result<ScenarioResult, SimError> {
        if let Some(count) = self.vehicles {
            config.vehicle_count = count;
        }
        let seed = config.seed;
        let mut sim = Simulation::new(config)?;
        let vehicle_count = sim.vehicles().len();

        let mut export = self.export.map(|options| {
            let export = SimExport::new(name, seed);
            if options.include_field {
                export.with_field(sim.field().clone())
            } else {
                export
            }
        });
        if let Some(export) = export.as_mut() {
            export.add_frame(sim.snapshot().into());
        }

        let mut metrics = ScenarioMetrics::default();
        let mut path_length = 0.0;
        let mut reading_sum = 0.0;
        let mut reading_count = 0u64;

        for _ in 0..self.steps {
            let before = sim.poses();
            {
                let sampler = sim.sampler();
                for vehicle in sim.vehicles() {
                    let sensors = vehicle.sensor_positions();
                    for point in [sensors.first, sensors.second] {
                        let reading = sampler.sample(point);
                        if reading.is_finite() {
                            reading_sum += reading;
                            reading_count += 1;
                        }
                    }
                }
            }

            let report = sim.step();
            metrics.sanitized_readings += report.sanitized as u64;
            metrics.restored_poses += report.restored as u64;

            for (prev, next) in before.iter().zip(sim.poses()) {
                path_length += (next.position() - prev.position()).norm();
            }

            if let (Some(export), Some(options)) = (export.as_mut(), self.export) {
                if report.tick % options.every == 0 {
                    export.add_frame(sim.snapshot().into());
                }
            }

            if report.tick % 60 == 0 {
                debug!(
                    "  tick={} | sanitized={} | restored={}",
                    report.tick, metrics.sanitized_readings, metrics.restored_poses
                );
            }
        }

        let finals = sim.poses();
        let outside = finals
            .iter()
            .filter(|p| {
                let cell = GridPoint::round(p.x, p.y);
                !sim.field().contains(cell.x, cell.y)
            })
            .count();

        metrics.mean_path_length = path_length / vehicle_count as f64;
        metrics.mean_reading = if reading_count > 0 {
            reading_sum / reading_count as f64
        } else {
            0.0
        };
        metrics.outside_fraction = outside as f64 / vehicle_count as f64;

        let all_finite = finals.iter().all(|p| p.is_finite());
        let passed = metrics.restored_poses == 0 && all_finite;
        let failure_reason = if !all_finite {
            Some("Non-finite final pose".to_string())
        } else if metrics.restored_poses > 0 {
            Some(format!("{} poses restored after overflow", metrics.restored_poses))
        } else {
            None
        };

        if passed {
            info!(
                "✓ {} complete: {} ticks, mean path {:.1}, {:.0}% off-field",
                name,
                sim.tick_count(),
                metrics.mean_path_length,
                metrics.outside_fraction * 100.0
            );
        } else {
            warn!("✗ {} finished with {} restored poses", name, metrics.restored_poses);
        }

        if let Some(export) = export.as_mut() {
            export.finalize(passed);
        }

        Ok(ScenarioResult {
            scenario: name.to_string(),
            seed,
            steps: sim.tick_count(),
            passed,
            failure_reason,
            metrics,
            export,
        })
    }
}
