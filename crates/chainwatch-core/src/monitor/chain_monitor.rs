//! Chain polling and alerting state machine

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::models::{ApiError, ChainActivity, ChainAlert, ChainReport, ChainStatus, InactiveReason};

use super::notifier::{Destination, Notifier};
use super::provider::StatusProvider;
use super::settings::{MonitorSettings, BACKOFF_GRACE_SECS, INACTIVE_BACKOFF_SECS};

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Monitoring is switched off
    Disabled,
    /// Inside the no-chain backoff window
    BackingOff {
        /// Epoch second the window closes
        until: i64,
    },
    /// The alert destination could not be resolved yet
    AwaitingDestination,
    /// The status request produced nothing usable
    FetchFailed,
    /// The API answered with an error payload
    ApiError(ApiError),
    /// No chain worth watching; backoff started
    Inactive(InactiveReason),
    /// Chain running with time to spare
    Healthy {
        /// Seconds left
        remaining: i64,
    },
    /// Chain nearing its end, but an alert went out recently
    Throttled {
        /// Seconds left
        remaining: i64,
    },
    /// An alert was raised
    Alerted(ChainAlert),
}

/// Point-in-time view of the monitor, for status endpoints
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    /// Command-controlled settings
    pub settings: MonitorSettings,
    /// Last successfully fetched status
    pub last_known_chain: Option<ChainStatus>,
    /// Estimated chain end (epoch seconds)
    pub chain_end: i64,
    /// Last alert (epoch seconds)
    pub last_alert: i64,
    /// Fetches are skipped before this (epoch seconds)
    pub next_fetch_not_before: i64,
    /// Resolved alert destination
    pub destination: Option<Destination>,
}

#[derive(Debug)]
struct MonitorState {
    last_known: Option<ChainStatus>,
    chain_end: i64,
    last_alert: i64,
    next_fetch_not_before: i64,
    destination: Option<Destination>,
}

impl MonitorState {
    fn new(now: i64) -> Self {
        Self {
            last_known: None,
            chain_end: now,
            last_alert: now,
            next_fetch_not_before: now,
            destination: None,
        }
    }
}

/// Watches the faction chain and alerts when it is about to time out.
///
/// Settings sit behind a short-lived lock so commands never wait on a slow
/// fetch. Tick state sits behind an async lock held for the whole tick, so
/// ticks are strictly serialized.
pub struct ChainMonitor {
    provider: Arc<dyn StatusProvider>,
    notifier: Arc<dyn Notifier>,
    settings: Mutex<MonitorSettings>,
    state: tokio::sync::Mutex<MonitorState>,
}

impl ChainMonitor {
    /// Create a monitor whose clocks start now
    pub fn new(
        provider: Arc<dyn StatusProvider>,
        notifier: Arc<dyn Notifier>,
        settings: MonitorSettings,
    ) -> Self {
        Self::starting_at(provider, notifier, settings, Utc::now().timestamp())
    }

    /// Create a monitor whose clocks start at `now` (epoch seconds)
    pub fn starting_at(
        provider: Arc<dyn StatusProvider>,
        notifier: Arc<dyn Notifier>,
        settings: MonitorSettings,
        now: i64,
    ) -> Self {
        Self {
            provider,
            notifier,
            settings: Mutex::new(settings),
            state: tokio::sync::Mutex::new(MonitorState::new(now)),
        }
    }

    /// Current settings
    pub fn settings(&self) -> MonitorSettings {
        *self.settings.lock()
    }

    /// Mutate settings atomically with respect to ticks and other commands
    pub fn update_settings<R>(&self, f: impl FnOnce(&mut MonitorSettings) -> R) -> R {
        f(&mut self.settings.lock())
    }

    /// Snapshot of settings and tick state. Waits for a running tick.
    pub async fn snapshot(&self) -> MonitorSnapshot {
        let state = self.state.lock().await;
        MonitorSnapshot {
            settings: self.settings(),
            last_known_chain: state.last_known.clone(),
            chain_end: state.chain_end,
            last_alert: state.last_alert,
            next_fetch_not_before: state.next_fetch_not_before,
            destination: state.destination.clone(),
        }
    }

    /// Run one tick against the wall clock
    pub async fn tick(&self) -> TickOutcome {
        self.tick_at(Utc::now()).await
    }

    /// Run one tick as if the time were `now`
    pub async fn tick_at(&self, now: DateTime<Utc>) -> TickOutcome {
        let mut state = self.state.lock().await;

        let settings = self.settings();
        if !settings.watching() {
            return TickOutcome::Disabled;
        }

        let ts = now.timestamp();

        if ts < state.next_fetch_not_before - BACKOFF_GRACE_SECS {
            return TickOutcome::BackingOff {
                until: state.next_fetch_not_before,
            };
        }

        let destination = match state.destination.clone() {
            Some(destination) => destination,
            None => match self.notifier.resolve_destination().await {
                Some(destination) => {
                    info!(
                        channel_id = %destination.channel_id,
                        name = destination.name.as_deref().unwrap_or("-"),
                        "Alert destination resolved"
                    );
                    state.destination = Some(destination.clone());
                    destination
                }
                None => {
                    debug!("Alert destination not ready, deferring");
                    return TickOutcome::AwaitingDestination;
                }
            },
        };

        // Far from the known end the cached status is still good enough.
        let cached = state
            .last_known
            .clone()
            .filter(|_| ts < state.chain_end.saturating_sub(settings.chain_threshold()));

        let status = match cached {
            Some(status) => status,
            None => {
                debug!("Updating chain details");
                match self.provider.fetch_chain().await {
                    Ok(ChainReport::Status(status)) => {
                        state.last_known = Some(status.clone());
                        status
                    }
                    Ok(ChainReport::ApiError(err)) => {
                        warn!(code = err.code, error = %err.error, "Torn API refused chain request");
                        return TickOutcome::ApiError(err);
                    }
                    Err(e) => {
                        warn!(error = %e, transient = e.is_transient(), "Failed to retrieve chain details");
                        return TickOutcome::FetchFailed;
                    }
                }
            }
        };

        if let ChainActivity::Inactive(reason) = status.activity() {
            state.next_fetch_not_before = ts + INACTIVE_BACKOFF_SECS;
            debug!(%reason, delay_secs = INACTIVE_BACKOFF_SECS, "No active chain, delaying next check");
            return TickOutcome::Inactive(reason);
        }

        state.chain_end = status.end;
        let remaining = state.chain_end.saturating_sub(ts);
        debug!(remaining, hits = status.current, "Chain remaining time");

        if remaining >= settings.chain_threshold() {
            return TickOutcome::Healthy { remaining };
        }

        if ts <= state.last_alert + settings.alert_threshold() {
            debug!(remaining, last_alert = state.last_alert, "Alert throttled");
            return TickOutcome::Throttled { remaining };
        }

        state.last_alert = ts;
        let alert = ChainAlert::new(&status, remaining, settings.chain_threshold(), now);

        info!(
            remaining,
            hits = alert.hits,
            goal = alert.goal,
            severity = ?alert.severity,
            "Chain nearing end, alerting"
        );
        if let Err(e) = self.notifier.send_alert(&destination, &alert).await {
            error!(channel_id = %destination.channel_id, error = %e, "Failed to send chain alert");
        }

        TickOutcome::Alerted(alert)
    }
}
