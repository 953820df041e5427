//! Alert data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chain::ChainStatus;

/// Alert severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Inside the threshold, with some time still left
    #[default]
    Warning,
    /// Half the threshold or less remains
    Critical,
}

impl Severity {
    /// Pick a severity from the remaining time and the configured threshold
    pub fn for_remaining(remaining: i64, chain_threshold: i64) -> Self {
        if remaining.saturating_mul(2) <= chain_threshold {
            Self::Critical
        } else {
            Self::Warning
        }
    }

    /// Embed colour as a 24-bit RGB integer
    pub fn color(self) -> u32 {
        match self {
            Self::Warning => 0x00E6_7E22,
            Self::Critical => 0x00E7_4C3C,
        }
    }
}

/// A chain-ending-soon alert, ready for delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainAlert {
    /// Seconds left before the chain times out
    pub remaining: i64,

    /// Hits made so far
    pub hits: i64,

    /// Next bonus target
    pub goal: i64,

    /// Respect multiplier
    pub modifier: f64,

    /// Severity level
    pub severity: Severity,

    /// When the alert was raised
    pub triggered_at: DateTime<Utc>,
}

impl ChainAlert {
    /// Build an alert for `status` with `remaining` seconds left
    pub fn new(
        status: &ChainStatus,
        remaining: i64,
        chain_threshold: i64,
        triggered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            remaining,
            hits: status.current,
            goal: status.max,
            modifier: status.modifier,
            severity: Severity::for_remaining(remaining, chain_threshold),
            triggered_at,
        }
    }

    /// Message title
    pub fn title(&self) -> String {
        ":bell: Chain Alert :bell:".to_string()
    }

    /// Message body
    pub fn description(&self) -> String {
        format!(
            "The chain is nearing end, only `{}` seconds left!",
            self.remaining
        )
    }

    /// Name/value pairs shown under the description
    pub fn fields(&self) -> [(&'static str, String); 3] {
        [
            ("Hits", self.hits.to_string()),
            ("Goal", self.goal.to_string()),
            ("Modifier", format!("{}x", self.modifier)),
        ]
    }
}
