use std::time::Duration;
use tracing::debug;

/// Fixed throttle: sleep `pause` after every `every`-th dispatched batch.
///
/// It never looks at provider responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub every: usize,
    pub pause: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            every: 40,
            pause: Duration::from_secs(1),
        }
    }
}

/// Per-dispatch batch counter driving [`Pacing`].
#[derive(Debug)]
pub struct Pacer {
    pacing: Pacing,
    dispatched: usize,
}

impl Pacer {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            dispatched: 0,
        }
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Count one completed batch and pause when the count hits the interval.
    ///
    /// The pause also applies when the interval-hitting batch is the last one.
    pub async fn batch_done(&mut self) {
        self.dispatched += 1;
        if self.pacing.every != 0 && self.dispatched % self.pacing.every == 0 {
            debug!(
                batches = self.dispatched,
                pause = ?self.pacing.pause,
                "pacing pause"
            );
            tokio::time::sleep(self.pacing.pause).await;
        }
    }
}
