//! Real-time driver: steps a shared simulation once per clock period.

use braitenberg_core::{Simulation, Snapshot};
use braitenberg_env::{Clock, EnvError, TickRate};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

struct RunningLoop {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<Result<u64, EnvError>>,
}

/// Owns a simulation and a background stepping task.
///
/// `start` and `stop` mirror a render loop's interval timer: starting twice
/// keeps the first loop, stopping an idle driver does nothing. A loop that
/// died on a poisoned lock reports it from `stop`.
pub struct SimulationDriver<C: Clock> {
    simulation: Arc<Mutex<Simulation>>,
    clock: Arc<C>,
    rate: TickRate,
    running: Option<RunningLoop>,
}

impl<C: Clock> SimulationDriver<C> {
    pub fn new(simulation: Simulation, clock: Arc<C>, rate: TickRate) -> Self {
        Self {
            simulation: Arc::new(Mutex::new(simulation)),
            clock,
            rate,
            running: None,
        }
    }

    pub fn rate(&self) -> TickRate {
        self.rate
    }

    pub fn clock(&self) -> &Arc<C> {
        &self.clock
    }

    /// Shared handle to the simulation being driven.
    pub fn simulation(&self) -> Arc<Mutex<Simulation>> {
        Arc::clone(&self.simulation)
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.join.is_finished())
    }

    /// Spawns the stepping task. Returns `false` if one is already running.
    ///
    /// A loop that already exited is discarded along with its result.
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            debug!("Driver already running; start ignored");
            return false;
        }
        if self.running.take().is_some() {
            warn!("Previous driver loop exited on its own; starting a new one");
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let simulation = Arc::clone(&self.simulation);
        let clock = Arc::clone(&self.clock);
        let period = self.rate.period();

        let join = tokio::spawn(async move {
            let mut ticks = 0u64;
            loop {
                if *stop_rx.borrow() {
                    break;
                }
                {
                    let mut sim = match simulation.lock() {
                        Ok(sim) => sim,
                        Err(e) => {
                            error!("Simulation lock poisoned, stopping driver: {}", e);
                            return Err(EnvError::poisoned(e));
                        }
                    };
                    let report = sim.step();
                    if report.restored > 0 {
                        debug!("tick {}: {} poses restored", report.tick, report.restored);
                    }
                }
                ticks += 1;

                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = clock.sleep(period) => {}
                }
            }
            Ok(ticks)
        });

        info!("Driver started at {}", self.rate);
        self.running = Some(RunningLoop { stop_tx, join });
        true
    }

    /// Signals the stepping task and waits for it, returning the ticks it ran.
    ///
    /// Returns `Ok(0)` when nothing was running, or the error that ended the
    /// loop early.
    pub async fn stop(&mut self) -> Result<u64, EnvError> {
        let Some(running) = self.running.take() else {
            return Ok(0);
        };

        // The task may already have exited on its own
        let _ = running.stop_tx.send(true);
        let ticks = running.join.await.map_err(EnvError::task)??;
        info!("Driver stopped after {} ticks", ticks);
        Ok(ticks)
    }

    /// Current state of every vehicle.
    pub fn snapshot(&self) -> Result<Snapshot, EnvError> {
        let sim = self.simulation.lock().map_err(EnvError::poisoned)?;
        Ok(sim.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::VirtualClock;
    use braitenberg_core::{FieldConfig, SimulationConfig};
    use std::time::Duration;

    fn small_simulation() -> Simulation {
        Simulation::new(SimulationConfig {
            seed: 11,
            field: FieldConfig {
                width: 64,
                height: 64,
                ..Default::default()
            },
            vehicle_count: 3,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_start_step_stop() {
        let clock = VirtualClock::shared(11);
        let mut driver =
            SimulationDriver::new(small_simulation(), clock.clone(), TickRate::default());

        assert!(driver.start());
        assert!(driver.is_running());
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        let ticks = driver.stop().await.unwrap();

        assert!(ticks > 0);
        assert!(!driver.is_running());
        assert_eq!(driver.snapshot().unwrap().tick, ticks);
        // One period slept per completed tick, except possibly the last
        assert!(clock.now() >= TickRate::default().period() * (ticks as u32 - 1));
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let clock = VirtualClock::shared(1);
        let mut driver = SimulationDriver::new(small_simulation(), clock, TickRate::default());

        assert!(driver.start());
        assert!(!driver.start());
        tokio::task::yield_now().await;
        assert!(driver.stop().await.is_ok());
    }

    #[tokio::test]
    async fn test_stop_when_idle() {
        let clock = VirtualClock::shared(1);
        let mut driver = SimulationDriver::new(small_simulation(), clock, TickRate::default());

        assert_eq!(driver.stop().await.unwrap(), 0);
        assert_eq!(driver.snapshot().unwrap().tick, 0);
    }

    #[tokio::test]
    async fn test_restart_continues_simulation() {
        let clock = VirtualClock::shared(2);
        let mut driver = SimulationDriver::new(small_simulation(), clock, TickRate::default());

        driver.start();
        tokio::task::yield_now().await;
        let first = driver.stop().await.unwrap();

        driver.start();
        tokio::task::yield_now().await;
        let second = driver.stop().await.unwrap();

        assert_eq!(driver.snapshot().unwrap().tick, first + second);
    }

    #[tokio::test]
    async fn test_tokio_clock_drives_in_real_time() {
        let clock = braitenberg_env::TokioClock::shared();
        let rate = TickRate::new(200.0).unwrap();
        let mut driver = SimulationDriver::new(small_simulation(), clock, rate);

        driver.start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let ticks = driver.stop().await.unwrap();

        assert!(ticks >= 1);
    }

    fn poison(simulation: Arc<Mutex<Simulation>>) {
        let panicked = std::thread::spawn(move || {
            let _guard = simulation.lock().unwrap();
            panic!("panic while holding the simulation");
        })
        .join();
        assert!(panicked.is_err());
    }

    #[tokio::test]
    async fn test_poisoned_simulation_is_reported() {
        let clock = VirtualClock::shared(4);
        let mut driver = SimulationDriver::new(small_simulation(), clock, TickRate::default());
        poison(driver.simulation());

        assert!(driver.start());
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!driver.is_running());

        assert!(matches!(driver.stop().await, Err(EnvError::Poisoned(_))));
        assert!(matches!(driver.snapshot(), Err(EnvError::Poisoned(_))));
        assert_eq!(driver.stop().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_start_replaces_exited_loop() {
        let clock = VirtualClock::shared(5);
        let mut driver = SimulationDriver::new(small_simulation(), clock, TickRate::default());
        poison(driver.simulation());

        assert!(driver.start());
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(driver.start());
        assert!(driver.stop().await.is_err());
    }
}
