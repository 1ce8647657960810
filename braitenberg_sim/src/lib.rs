//! Braitenberg Simulation Harness
//!
//! Runs heat-field simulations two ways:
//! - **Headless**: [`ScenarioRunner`] steps a preset or a config file as fast
//!   as possible, scores the run and optionally records frames for export
//! - **Real time**: [`SimulationDriver`] steps a shared simulation on a
//!   background task once per [`TickRate`](braitenberg_env::TickRate) period,
//!   against any [`Clock`](braitenberg_env::Clock)
//!
//! # Usage
//!
//! ```ignore
//! use braitenberg_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42)
//!     .with_steps(600)
//!     .run(ScenarioId::Crossed)?;
//! assert!(result.passed);
//! ```

mod config;
mod context;
mod driver;
mod error;
mod exporter;
mod runner;
pub mod scenarios;

pub use config::{load_config, parse_config};
pub use context::VirtualClock;
pub use driver::SimulationDriver;
pub use error::SimError;
pub use exporter::{SimExport, SimFrame};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
