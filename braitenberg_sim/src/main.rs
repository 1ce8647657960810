//! Braitenberg Simulator CLI
//!
//! Run heat-field vehicle scenarios headlessly or in real time.

use braitenberg_core::{Simulation, SimulationConfig};
use braitenberg_env::{TickRate, TokioClock};
use braitenberg_sim::scenarios::ScenarioId;
use braitenberg_sim::{load_config, ScenarioResult, ScenarioRunner, SimError, SimulationDriver};
use clap::Parser;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Braitenberg heat-field simulator
#[derive(Parser, Debug)]
#[command(name = "braitenberg-sim")]
#[command(about = "Run Braitenberg vehicles over a noise heat field", long_about = None)]
struct Args {
    /// Master seed for the field and vehicle placement [default: 42]
    #[arg(short, long)]
    seed: Option<u64>,

    /// Override the number of vehicles
    #[arg(short = 'n', long)]
    vehicles: Option<usize>,

    /// Scenario to run (crossed, direct, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Ticks per headless run
    #[arg(long, default_value = "600")]
    steps: u64,

    /// JSON configuration file (replaces --scenario)
    #[arg(short, long)]
    config: Option<String>,

    /// Export frames to a JSON file (single run only)
    #[arg(long)]
    export: Option<String>,

    /// Ticks between exported frames
    #[arg(long, default_value = "10")]
    export_every: u64,

    /// Include the heat grid in the export
    #[arg(long)]
    include_field: bool,

    /// Step on the wall clock instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Real-time run length in seconds
    #[arg(short, long, default_value = "10")]
    duration: f64,

    /// Real-time step rate in Hz
    #[arg(long, default_value = "60")]
    rate: f64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for scripting
    #[arg(long)]
    json: bool,
}

const DEFAULT_SEED: u64 = 42;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !args.json {
        info!("Braitenberg Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let outcome = if args.realtime {
        run_realtime(&args).await
    } else {
        run_headless(&args)
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn selected_scenarios(args: &Args) -> Result<Vec<ScenarioId>, SimError> {
    if args.scenario == "all" {
        Ok(ScenarioId::all())
    } else {
        Ok(vec![args.scenario.parse()?])
    }
}

/// The one configuration a real-time or config-file run uses, with CLI
/// overrides applied.
fn single_config(args: &Args) -> Result<(String, SimulationConfig), SimError> {
    let (name, mut config) = if let Some(path) = &args.config {
        let mut config = load_config(path)?;
        if let Some(seed) = args.seed {
            config.seed = seed;
        }
        ("custom".to_string(), config)
    } else {
        let scenarios = selected_scenarios(args)?;
        let [scenario] = scenarios.as_slice() else {
            return Err(SimError::usage("--realtime needs a single scenario, not 'all'"));
        };
        let seed = args.seed.unwrap_or(DEFAULT_SEED);
        (scenario.name().to_string(), scenario.config(seed))
    };

    if let Some(count) = args.vehicles {
        config.vehicle_count = count;
    }
    Ok((name, config))
}

fn run_headless(args: &Args) -> Result<bool, SimError> {
    let mut runner = ScenarioRunner::new(args.seed.unwrap_or(DEFAULT_SEED)).with_steps(args.steps);
    if let Some(count) = args.vehicles {
        runner = runner.with_vehicles(count);
    }
    if args.export.is_some() {
        runner = runner.with_export(args.export_every, args.include_field);
    }

    let runs: Vec<Result<ScenarioResult, SimError>> = if args.config.is_some() {
        let (_, config) = single_config(args)?;
        vec![runner.run_config(config)]
    } else {
        let scenarios = selected_scenarios(args)?;
        if args.export.is_some() && scenarios.len() > 1 {
            return Err(SimError::usage(
                "--export only supports a single scenario, not 'all'",
            ));
        }
        scenarios.into_iter().map(|s| runner.run(s)).collect()
    };

    let mut results: Vec<ScenarioResult> = Vec::new();
    for run in runs {
        let result = run?;

        if !args.json {
            if result.passed {
                info!("✓ {} (seed={}) PASSED", result.scenario, result.seed);
            } else {
                error!(
                    "✗ {} (seed={}) FAILED: {}",
                    result.scenario,
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }

        if let (Some(path), Some(export)) = (&args.export, &result.export) {
            export.write_to_file(path)?;
            info!("Exported {} frames to {}", export.frames.len(), path);
        }

        results.push(result);
    }

    let total = results.len();
    let failed = results.iter().filter(|r| !r.passed).count();

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed,
            "failed": failed,
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        if failed == 0 {
            info!("✅ All {} runs passed!", total);
        } else {
            error!("❌ {}/{} runs failed!", failed, total);
        }
    }

    Ok(failed == 0)
}

async fn run_realtime(args: &Args) -> Result<bool, SimError> {
    if !(args.duration.is_finite() && args.duration >= 0.0) {
        return Err(SimError::usage(format!("invalid duration: {}", args.duration)));
    }
    let duration = Duration::from_secs_f64(args.duration);
    let (name, config) = single_config(args)?;

    let rate = TickRate::new(args.rate)?;
    let simulation = Simulation::new(config)?;
    let mut driver = SimulationDriver::new(simulation, TokioClock::shared(), rate);

    info!("Running {} in real time for {:.1}s at {}", name, args.duration, rate);
    driver.start();
    tokio::time::sleep(duration).await;
    let ticks = driver.stop().await?;

    let snapshot = driver.snapshot()?;
    let finite = snapshot
        .vehicles
        .iter()
        .all(|v| v.x.is_finite() && v.y.is_finite() && v.theta.is_finite());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        info!(
            "{} ran {} ticks (expected ~{})",
            name,
            ticks,
            rate.ticks_in(duration)
        );
    }

    Ok(finite)
}
