//! Periodic tick driver

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, trace};

use super::chain_monitor::ChainMonitor;

/// Ticks a [`ChainMonitor`] at a fixed period.
///
/// Each tick is awaited before the next one is scheduled, and missed ticks
/// are delayed rather than bunched, so a slow fetch pushes later ticks back.
pub struct Scheduler {
    monitor: Arc<ChainMonitor>,
    period: Duration,
}

impl Scheduler {
    /// Create a scheduler
    pub fn new(monitor: Arc<ChainMonitor>, period: Duration) -> Self {
        Self { monitor, period }
    }

    /// Run forever
    pub async fn run(self) {
        info!(period = ?self.period, "Starting chain monitor");

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let outcome = self.monitor.tick().await;
            trace!(?outcome, "Tick complete");
        }
    }

    /// Run on a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
