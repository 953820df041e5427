//! # Chainwatch
//!
//! Watches a Torn faction's chain and raises a Discord alert when it is
//! about to time out.
//!
//! ## Architecture
//!
//! - **Monitor**: periodic state machine deciding when to fetch, when a chain
//!   is at risk, and when an alert is due
//! - **Providers**: Torn API client and Discord notifier
//! - **Commands**: enable/disable/threshold controls, served over HTTP
//!
//! ## Quick Start
//!
//! ```bash
//! # Watch the chain and serve the command API
//! TORN_TOKEN=... DISCORD_TOKEN=... DISCORD_CHANNEL_ID=... chainwatch serve --watch
//!
//! # One-off status check
//! chainwatch check
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod service;

pub use config::Config;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::commands::{Command, CommandReply, ThresholdUpdate};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::monitor::{ChainMonitor, MonitorSettings, Notifier, StatusProvider, TickOutcome};
    pub use crate::service::ChainWatcher;
}
