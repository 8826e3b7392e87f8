//! Refresh loop
//!
//! Drives repeated poll-aggregate-render cycles at a fixed interval. The
//! inter-iteration wait is interruptible: a shutdown signal takes effect
//! within one interval and no timer outlives cancellation. Iterations never
//! overlap.

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, info};

/// Single-shot vs continuous operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Run exactly one cycle.
    Once,
    /// Run until a shutdown signal arrives.
    Continuous,
}

/// Cancellable fixed-interval scheduler for report cycles.
#[derive(Debug, Clone)]
pub struct RefreshLoop {
    interval: Duration,
    mode: RefreshMode,
}

impl RefreshLoop {
    pub fn new(interval: Duration, mode: RefreshMode) -> Self {
        Self { interval, mode }
    }

    pub fn once() -> Self {
        Self::new(Duration::ZERO, RefreshMode::Once)
    }

    /// Run cycles until completion or cancellation; returns the number of
    /// cycles executed. Each cycle runs to completion before the next wait
    /// begins.
    pub async fn run<F, Fut>(&self, mut shutdown: broadcast::Receiver<()>, mut cycle: F) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        if self.mode == RefreshMode::Continuous {
            info!(interval_secs = self.interval.as_secs(), "Starting refresh loop");
        }

        let mut iterations = 0u64;
        loop {
            cycle().await;
            iterations += 1;

            if self.mode == RefreshMode::Once {
                break;
            }

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = shutdown.recv() => {
                    debug!(iterations, "Refresh loop cancelled");
                    break;
                }
            }
        }

        iterations
    }
}
