//! Time source trait for simulation drivers.

use async_trait::async_trait;
use std::time::Duration;

/// The driver's view of time.
///
/// # Implementations
///
/// - **Production**: `TokioClock` - wraps `Instant` and `tokio::time::sleep`
/// - **Tests**: `VirtualClock` (in `braitenberg_sim`) - advances on `sleep`
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    /// Monotonic time since the clock was created.
    ///
    /// Virtual clocks report accumulated virtual time.
    fn now(&self) -> Duration;

    /// Suspends the caller for `duration`.
    async fn sleep(&self, duration: Duration);

    /// Seed the clock was built from (0 when not seeded).
    fn seed(&self) -> u64;
}
