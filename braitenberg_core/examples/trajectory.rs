//! Trajectory Demo
//! ===============
//!
//! Drops one vehicle in the middle of a seeded heat field and prints its pose
//! and sensor readings for a few hundred ticks.
//!
//! Run:
//! ```bash
//! cargo run --example trajectory -- 2024
//! ```

use braitenberg_core::{
    advance, FieldConfig, FieldGenerator, FieldSampler, OutOfBounds, Pose, Vehicle, VehicleParams,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let seed: u32 = std::env::args()
        .nth(1)
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(2024);

    let config = FieldConfig::default();
    let field = FieldGenerator::generate_from(seed, &config)?;
    let stats = field.stats();
    println!(
        "Field {}x{} seed {}: min {:.3} max {:.3} mean {:.3}",
        field.width(),
        field.height(),
        seed,
        stats.min,
        stats.max,
        stats.mean
    );

    let sampler = FieldSampler::new(&field, OutOfBounds::Clamp);
    let start = Pose::new(config.width as f64 / 2.0, config.height as f64 / 2.0, 0.0);
    let mut vehicle = Vehicle::new(start, VehicleParams::default())?;

    println!("{:>5} {:>9} {:>9} {:>8} {:>8} {:>8}", "tick", "x", "y", "theta", "r1", "r2");
    for tick in 0..300u32 {
        let sensors = vehicle.sensor_positions();
        let r1 = sampler.sample_xy(sensors.first.x, sensors.first.y);
        let r2 = sampler.sample_xy(sensors.second.x, sensors.second.y);

        advance(&mut vehicle, &sampler);

        if tick % 10 == 0 {
            let pose = vehicle.pose();
            println!(
                "{:>5} {:>9.2} {:>9.2} {:>8.3} {:>8.3} {:>8.3}",
                tick, pose.x, pose.y, pose.theta, r1, r2
            );
        }
    }

    let end = vehicle.pose();
    println!(
        "\nTravelled {:.1} units from the centre",
        (end.position() - start.position()).norm()
    );
    Ok(())
}
