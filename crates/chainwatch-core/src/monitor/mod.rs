//! Chain monitor for Chainwatch
//!
//! A single [`ChainMonitor`] owns everything known about the faction's chain.
//! The [`Scheduler`] ticks it periodically; each tick may fetch fresh status
//! through a [`StatusProvider`] and alert through a [`Notifier`].

mod chain_monitor;
mod notifier;
mod provider;
mod scheduler;
mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use chain_monitor::{ChainMonitor, MonitorSnapshot, TickOutcome};
pub use notifier::{Destination, DiscordNotifier, Notifier};
pub use provider::{StatusProvider, TornClient};
pub use scheduler::Scheduler;
pub use settings::{
    MonitorSettings, ALERT_THRESHOLD_BOUNDS, BACKOFF_GRACE_SECS, CHAIN_THRESHOLD_BOUNDS,
    INACTIVE_BACKOFF_SECS,
};
