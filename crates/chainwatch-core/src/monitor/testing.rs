//! In-memory collaborators for monitor tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use super::{ChainMonitor, Destination, MonitorSettings, Notifier, StatusProvider};
use crate::error::{Error, Result};
use crate::models::{ChainAlert, ChainReport, ChainStatus};

/// Returns whatever report it was last given; `None` is a hard failure.
#[derive(Default)]
pub(crate) struct FakeProvider {
    report: Mutex<Option<ChainReport>>,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub(crate) fn set(&self, report: Option<ChainReport>) {
        *self.report.lock() = report;
    }

    pub(crate) fn set_status(&self, status: ChainStatus) {
        self.set(Some(ChainReport::Status(status)));
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusProvider for FakeProvider {
    async fn fetch_chain(&self) -> Result<ChainReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.report
            .lock()
            .clone()
            .ok_or_else(|| Error::Decode("connection reset".to_string()))
    }
}

/// Records alerts instead of delivering them.
pub(crate) struct FakeNotifier {
    destination: Mutex<Option<Destination>>,
    sent: Mutex<Vec<ChainAlert>>,
    resolves: AtomicUsize,
    fail_delivery: AtomicBool,
}

impl Default for FakeNotifier {
    fn default() -> Self {
        Self {
            destination: Mutex::new(Some(Destination {
                channel_id: "42".to_string(),
                name: Some("chain-alerts".to_string()),
            })),
            sent: Mutex::new(Vec::new()),
            resolves: AtomicUsize::new(0),
            fail_delivery: AtomicBool::new(false),
        }
    }
}

impl FakeNotifier {
    pub(crate) fn unresolved() -> Self {
        let notifier = Self::default();
        *notifier.destination.lock() = None;
        notifier
    }

    pub(crate) fn set_destination(&self, destination: Option<Destination>) {
        *self.destination.lock() = destination;
    }

    pub(crate) fn fail_delivery(&self, fail: bool) {
        self.fail_delivery.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn sent(&self) -> Vec<ChainAlert> {
        self.sent.lock().clone()
    }

    pub(crate) fn resolves(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn resolve_destination(&self) -> Option<Destination> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        self.destination.lock().clone()
    }

    async fn send_alert(&self, _destination: &Destination, alert: &ChainAlert) -> Result<()> {
        self.sent.lock().push(alert.clone());
        if self.fail_delivery.load(Ordering::SeqCst) {
            return Err(Error::notification("channel gone"));
        }
        Ok(())
    }
}

/// Epoch second the test monitors are created at
pub(crate) const T0: i64 = 1_700_000_000;

pub(crate) fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// A running chain ending at `end`
pub(crate) fn active_chain(end: i64) -> ChainStatus {
    ChainStatus {
        id: 7,
        current: 97,
        max: 100,
        timeout: 0,
        modifier: 1.5,
        cooldown: 0,
        start: T0 - 3_600,
        end,
    }
}

pub(crate) struct Harness {
    pub(crate) monitor: Arc<ChainMonitor>,
    pub(crate) provider: Arc<FakeProvider>,
    pub(crate) notifier: Arc<FakeNotifier>,
}

pub(crate) fn harness(settings: MonitorSettings) -> Harness {
    harness_with(settings, FakeNotifier::default())
}

pub(crate) fn harness_with(settings: MonitorSettings, notifier: FakeNotifier) -> Harness {
    let provider = Arc::new(FakeProvider::default());
    let notifier = Arc::new(notifier);
    let monitor = Arc::new(ChainMonitor::starting_at(
        provider.clone(),
        notifier.clone(),
        settings,
        T0,
    ));
    Harness {
        monitor,
        provider,
        notifier,
    }
}
