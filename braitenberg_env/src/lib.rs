//! Braitenberg Environment Abstraction Layer
//!
//! Decouples the simulation driver from wall-clock time so the same stepping
//! loop runs in **Production** (tokio timers) and in **Tests** (a virtual clock).
//!
//! # Core Concept
//!
//! The driver never calls `tokio::time` directly. It asks a [`Clock`] for the
//! current time and to sleep one [`TickRate`] period between steps:
//!
//! ```ignore
//! use braitenberg_env::{Clock, TickRate};
//!
//! async fn step_loop<C: Clock>(clock: &C, rate: TickRate) {
//!     loop {
//!         step();
//!         clock.sleep(rate.period()).await;
//!     }
//! }
//! ```

mod context;
mod error;
mod tokio_impl;
mod types;

pub use context::Clock;
pub use error::EnvError;
pub use tokio_impl::TokioClock;
pub use types::TickRate;
