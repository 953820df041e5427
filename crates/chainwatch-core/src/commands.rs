//! Chat-style commands that control the monitor
//!
//! These mirror the `/chainwatch enable|disable|threshold` commands: each one
//! applies its change to the shared [`ChainMonitor`] and answers with a short
//! line of text.

use serde::Deserialize;
use tracing::info;

use crate::monitor::ChainMonitor;

/// A command against the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start polling and alerting
    Enable,
    /// Stop polling and alerting
    Disable,
    /// Read or update thresholds
    Threshold(ThresholdUpdate),
}

/// Optional new threshold values, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ThresholdUpdate {
    /// New chain threshold
    pub chain: Option<i64>,
    /// New alert threshold
    pub alert: Option<i64>,
}

/// Reply to a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    /// Text for the caller
    pub message: String,
    /// Whether any supplied value was refused
    pub rejected: bool,
}

impl CommandReply {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            rejected: false,
        }
    }
}

/// Apply `command` to `monitor`
pub fn execute(monitor: &ChainMonitor, command: Command) -> CommandReply {
    match command {
        Command::Enable => {
            monitor.update_settings(|s| s.set_watching(true));
            info!("Chain watcher enabled");
            CommandReply::ok("Enabled!")
        }
        Command::Disable => {
            monitor.update_settings(|s| s.set_watching(false));
            info!("Chain watcher disabled");
            CommandReply::ok("Disabled!")
        }
        Command::Threshold(update) => set_thresholds(monitor, update),
    }
}

/// Validate and apply each supplied threshold independently. With nothing
/// supplied, report the current values.
pub fn set_thresholds(monitor: &ChainMonitor, update: ThresholdUpdate) -> CommandReply {
    monitor.update_settings(|settings| {
        if update.chain.is_none() && update.alert.is_none() {
            return CommandReply::ok(format!(
                "Current threshold values are: Chain `{}` | Alert `{}`",
                settings.chain_threshold(),
                settings.alert_threshold()
            ));
        }

        let mut lines = Vec::new();
        let mut rejected = false;

        if let Some(chain) = update.chain {
            match settings.set_chain_threshold(chain) {
                Ok(()) => {
                    info!(chain, "Chain threshold updated");
                    lines.push(format!("Chain threshold set to `{chain}` second(s)!"));
                }
                Err(e) => {
                    rejected = true;
                    lines.push(validation_text(&e));
                }
            }
        }

        if let Some(alert) = update.alert {
            match settings.set_alert_threshold(alert) {
                Ok(()) => {
                    info!(alert, "Alert threshold updated");
                    lines.push(format!("Alert threshold set to `{alert}` second(s)!"));
                }
                Err(e) => {
                    rejected = true;
                    lines.push(validation_text(&e));
                }
            }
        }

        CommandReply {
            message: lines.join("\n"),
            rejected,
        }
    })
}

fn validation_text(error: &crate::error::Error) -> String {
    match error {
        crate::error::Error::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}
