//! Runtime-adjustable monitor settings

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::config::MonitorConfig;
use crate::error::{Error, Result};

/// Allowed values for the chain threshold, in seconds
pub const CHAIN_THRESHOLD_BOUNDS: RangeInclusive<i64> = 30..=300;

/// Allowed values for the alert threshold, in seconds
pub const ALERT_THRESHOLD_BOUNDS: RangeInclusive<i64> = 10..=300;

/// How long to stop fetching after seeing no running chain
pub const INACTIVE_BACKOFF_SECS: i64 = 120;

/// Slack allowed on the backoff gate so a tick landing just before it opens
/// still fetches.
pub const BACKOFF_GRACE_SECS: i64 = 5;

/// The command-controlled part of the monitor.
///
/// Thresholds can only be changed through validating setters, so they are
/// always within their bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonitorSettings {
    watching: bool,
    chain_threshold: i64,
    alert_threshold: i64,
}

impl MonitorSettings {
    /// Create settings, validating both thresholds
    pub fn new(watching: bool, chain_threshold: i64, alert_threshold: i64) -> Result<Self> {
        let mut settings = Self {
            watching,
            chain_threshold: *CHAIN_THRESHOLD_BOUNDS.start(),
            alert_threshold: *ALERT_THRESHOLD_BOUNDS.start(),
        };
        settings.set_chain_threshold(chain_threshold)?;
        settings.set_alert_threshold(alert_threshold)?;
        Ok(settings)
    }

    /// Build from the `[monitor]` config section
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        Self::new(
            config.start_watching,
            config.chain_threshold_secs,
            config.alert_threshold_secs,
        )
    }

    /// Whether polling and alerting are on
    pub fn watching(&self) -> bool {
        self.watching
    }

    /// Remaining seconds below which the chain is nearing its end
    pub fn chain_threshold(&self) -> i64 {
        self.chain_threshold
    }

    /// Minimum seconds between alerts
    pub fn alert_threshold(&self) -> i64 {
        self.alert_threshold
    }

    /// Turn monitoring on or off
    pub fn set_watching(&mut self, watching: bool) {
        self.watching = watching;
    }

    /// Set the chain threshold; out-of-range values leave it unchanged
    pub fn set_chain_threshold(&mut self, secs: i64) -> Result<()> {
        check_bounds("Chain", secs, &CHAIN_THRESHOLD_BOUNDS)?;
        self.chain_threshold = secs;
        Ok(())
    }

    /// Set the alert threshold; out-of-range values leave it unchanged
    pub fn set_alert_threshold(&mut self, secs: i64) -> Result<()> {
        check_bounds("Alert", secs, &ALERT_THRESHOLD_BOUNDS)?;
        self.alert_threshold = secs;
        Ok(())
    }
}

fn check_bounds(name: &str, secs: i64, bounds: &RangeInclusive<i64>) -> Result<()> {
    if bounds.contains(&secs) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "{name} threshold value must be between {} and {} seconds",
            bounds.start(),
            bounds.end()
        )))
    }
}
