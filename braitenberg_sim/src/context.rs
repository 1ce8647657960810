//! Virtual clock implementing `Clock` for deterministic driver tests.

use async_trait::async_trait;
use braitenberg_env::Clock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Clock whose time only moves when someone sleeps on it or advances it.
///
/// Clones share the same time, so a test can hold one handle while the
/// driver task sleeps on another.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    /// Master seed for this run
    seed: u64,

    /// Current virtual time (nanoseconds since creation)
    virtual_time_ns: Arc<AtomicU64>,
}

impl VirtualClock {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ns: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates an Arc-wrapped clock for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        self.virtual_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        self.virtual_time_ns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    async fn sleep(&self, duration: Duration) {
        // Jump forward, then let other tasks observe the new time
        self.advance_time(duration);
        tokio::task::yield_now().await;
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_time() {
        let clock = VirtualClock::new(42);
        assert_eq!(clock.now(), Duration::ZERO);

        clock.advance_time(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_secs(1));

        clock.advance_time(Duration::from_millis(500));
        assert_eq!(clock.now(), Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_sleep_advances_virtual_time() {
        let clock = VirtualClock::new(7);
        clock.sleep(Duration::from_secs(3600)).await;
        assert_eq!(clock.now(), Duration::from_secs(3600));
    }

    #[test]
    fn test_virtual_clock_seed() {
        assert_eq!(VirtualClock::new(12345).seed(), 12345);
    }

    #[test]
    fn test_clone_shares_time() {
        let clock1 = VirtualClock::new(42);
        let clock2 = clock1.clone();

        clock1.advance_time(Duration::from_secs(5));

        assert_eq!(clock1.now(), clock2.now());
    }
}
