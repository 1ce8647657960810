//! Production implementation of `Clock` using Tokio.

use crate::Clock;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Wall-clock time backed by `Instant` and `tokio::time::sleep`.
pub struct TokioClock {
    /// Start time for monotonic duration calculations
    start: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Creates an Arc-wrapped clock for sharing across tasks.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn seed(&self) -> u64 {
        // Production is not seeded
        0
    }
}
