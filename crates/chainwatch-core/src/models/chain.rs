//! Chain status as reported by the Torn faction API

use std::fmt;

use serde::{Deserialize, Serialize};

/// `max` value Torn reports while a chain is still in its first tier.
pub const WARM_UP_MAX: i64 = 10;

/// Chain status for a faction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChainStatus {
    /// Chain identifier
    #[serde(default)]
    pub id: i64,

    /// Hits made so far
    pub current: i64,

    /// Hit count of the next bonus tier
    pub max: i64,

    /// Seconds until the chain times out, as of the request
    #[serde(default)]
    pub timeout: i64,

    /// Respect multiplier
    pub modifier: f64,

    /// Seconds of post-chain cooldown left
    pub cooldown: i64,

    /// Epoch seconds the chain started, 0 when none is running
    pub start: i64,

    /// Epoch seconds the chain times out
    pub end: i64,
}

/// Why a chain is not considered running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InactiveReason {
    /// No chain has been started
    NotStarted,
    /// A chain just ended and the faction is cooling down
    Cooldown,
    /// The chain is still in its warm-up tier
    WarmUp,
}

impl fmt::Display for InactiveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotStarted => "no chain running",
            Self::Cooldown => "chain on cooldown",
            Self::WarmUp => "chain in warm-up",
        };
        f.write_str(text)
    }
}

/// Activity classification of a [`ChainStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainActivity {
    /// A chain is running and can time out
    Active,
    /// Nothing worth alerting on
    Inactive(InactiveReason),
}

impl ChainStatus {
    /// Classify the chain. The checks run in a fixed order so the reported
    /// reason is stable when several apply.
    pub fn activity(&self) -> ChainActivity {
        if self.start == 0 {
            ChainActivity::Inactive(InactiveReason::NotStarted)
        } else if self.cooldown > 0 {
            ChainActivity::Inactive(InactiveReason::Cooldown)
        } else if self.max == WARM_UP_MAX {
            ChainActivity::Inactive(InactiveReason::WarmUp)
        } else {
            ChainActivity::Active
        }
    }

    /// Seconds until `end`, negative once it has passed
    pub fn remaining_at(&self, now: i64) -> i64 {
        self.end.saturating_sub(now)
    }
}

/// Error object returned by the Torn API in place of data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Torn error code
    pub code: i64,
    /// Human-readable message
    pub error: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.error, self.code)
    }
}

/// Raw body of `faction/?selections=chain`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChainResponse {
    /// The API refused the request
    Error {
        /// Error details
        error: ApiError,
    },
    /// Chain data
    Chain {
        /// Chain status
        chain: ChainStatus,
    },
}

/// Usable outcome of a status fetch
#[derive(Debug, Clone, PartialEq)]
pub enum ChainReport {
    /// Chain data was returned
    Status(ChainStatus),
    /// The API answered with an error payload
    ApiError(ApiError),
}

impl From<ChainResponse> for ChainReport {
    fn from(response: ChainResponse) -> Self {
        match response {
            ChainResponse::Error { error } => Self::ApiError(error),
            ChainResponse::Chain { chain } => Self::Status(chain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn chain(start: i64, cooldown: i64, max: i64) -> ChainStatus {
        ChainStatus {
            start,
            cooldown,
            max,
            end: 2_000,
            current: 42,
            modifier: 1.0,
            ..Default::default()
        }
    }

    #[rstest]
    #[case::not_started(0, 0, 50, ChainActivity::Inactive(InactiveReason::NotStarted))]
    #[case::not_started_wins(0, 30, 10, ChainActivity::Inactive(InactiveReason::NotStarted))]
    #[case::cooldown(1_000, 5, 50, ChainActivity::Inactive(InactiveReason::Cooldown))]
    #[case::warm_up(1_000, 0, 10, ChainActivity::Inactive(InactiveReason::WarmUp))]
    #[case::active(1_000, 0, 25, ChainActivity::Active)]
    #[case::active_high_tier(1_000, 0, 1_000, ChainActivity::Active)]
    fn test_activity(
        #[case] start: i64,
        #[case] cooldown: i64,
        #[case] max: i64,
        #[case] expected: ChainActivity,
    ) {
        assert_eq!(chain(start, cooldown, max).activity(), expected);
    }

    #[test]
    fn test_remaining() {
        let status = chain(1_000, 0, 25);
        assert_eq!(status.remaining_at(1_950), 50);
        assert_eq!(status.remaining_at(2_010), -10);
    }

    #[test]
    fn test_decode_chain_body() {
        let body = r#"{"chain":{"id":0,"current":37,"max":50,"timeout":212,
            "modifier":1.1,"cooldown":0,"start":1700000000,"end":1700000500}}"#;
        let response: ChainResponse = serde_json::from_str(body).unwrap();

        let ChainReport::Status(status) = ChainReport::from(response) else {
            panic!("expected chain status");
        };
        assert_eq!(status.current, 37);
        assert_eq!(status.max, 50);
        assert_eq!(status.end, 1_700_000_500);
        assert_eq!(status.activity(), ChainActivity::Active);
    }

    #[test]
    fn test_decode_error_body() {
        let body = r#"{"error":{"code":2,"error":"Incorrect key"}}"#;
        let response: ChainResponse = serde_json::from_str(body).unwrap();

        assert_eq!(
            ChainReport::from(response),
            ChainReport::ApiError(ApiError {
                code: 2,
                error: "Incorrect key".to_string(),
            })
        );
    }

    #[test]
    fn test_decode_rejects_unknown_shape() {
        let body = r#"{"faction":{"id":1}}"#;
        assert!(serde_json::from_str::<ChainResponse>(body).is_err());
    }
}
