//! Live throughput metric
//!
//! `ops_per_minute` counts entries whose timestamp lies less than one window
//! before `now` and divides by the window length in seconds. A store with
//! fewer than two entries always reports zero.
//!
//! `RateMonitor` recomputes the metric from a fresh snapshot after every
//! store mutation and publishes it on a watch channel.

use crate::store::LogStore;
use crate::types::AuditLogEntry;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Default trailing window
pub const DEFAULT_WINDOW_SECS: i64 = 60;

/// Entries needed before the metric is computed at all
const MIN_ENTRIES: usize = 2;

/// Throughput value, displayed with one decimal place
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct OpsPerMinute(f64);

impl OpsPerMinute {
    pub const ZERO: OpsPerMinute = OpsPerMinute(0.0);

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for OpsPerMinute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Ops/minute over the default 60 second window
pub fn ops_per_minute(entries: &[AuditLogEntry], now: DateTime<Utc>) -> OpsPerMinute {
    ops_in_window(entries, now, Duration::seconds(DEFAULT_WINDOW_SECS))
}

/// Ops/minute over a custom trailing window
pub fn ops_in_window(
    entries: &[AuditLogEntry],
    now: DateTime<Utc>,
    window: Duration,
) -> OpsPerMinute {
    if entries.len() < MIN_ENTRIES || window <= Duration::zero() {
        return OpsPerMinute::ZERO;
    }

    let recent = entries
        .iter()
        .filter(|entry| now.signed_duration_since(entry.timestamp) < window)
        .count();

    let window_secs = window.num_milliseconds() as f64 / 1000.0;
    OpsPerMinute(recent as f64 / window_secs)
}

/// Recomputes the metric whenever the store changes
pub struct RateMonitor {
    store: Arc<LogStore>,
    window: Duration,
    tx: watch::Sender<OpsPerMinute>,
}

impl RateMonitor {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self::with_window(store, Duration::seconds(DEFAULT_WINDOW_SECS))
    }

    pub fn with_window(store: Arc<LogStore>, window: Duration) -> Self {
        let (tx, _) = watch::channel(OpsPerMinute::ZERO);
        Self { store, window, tx }
    }

    /// Receiver for the latest published value
    pub fn watch(&self) -> watch::Receiver<OpsPerMinute> {
        self.tx.subscribe()
    }

    /// Last published value
    pub fn current(&self) -> OpsPerMinute {
        *self.tx.borrow()
    }

    /// Derive the metric from the store's current entries and publish it
    pub async fn recompute(&self, now: DateTime<Utc>) -> OpsPerMinute {
        let entries = self.store.snapshot().await;
        let rate = ops_in_window(&entries, now, self.window);
        self.tx.send_replace(rate);
        rate
    }

    /// Run the monitor in the background
    ///
    /// The task stops as soon as every watch receiver is dropped, or when the
    /// handle is aborted. The store subscription is taken before this
    /// returns, so no mutation made after `spawn` is missed.
    pub fn spawn(self) -> (watch::Receiver<OpsPerMinute>, JoinHandle<()>) {
        let mut events = self.store.subscribe();
        let rx = self.watch();

        let handle = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    event = events.recv() => event,
                    _ = self.tx.closed() => break,
                };
                match event {
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Rate monitor lagged behind store events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                let rate = self.recompute(Utc::now()).await;
                tracing::trace!(rate = %rate, "Ops/minute recomputed");
            }
            tracing::debug!("Rate monitor stopped");
        });

        (rx, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::memory::MemoryProvider;
    use crate::types::{ActionType, AuditLogSummary, Severity};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
    }

    fn at(offset_secs: i64) -> AuditLogEntry {
        AuditLogEntry::new("ops", "Heartbeat", ActionType::System, Severity::Low)
            .at(now() - Duration::seconds(offset_secs))
    }

    #[test]
    fn test_two_in_window_rounds_down() {
        let entries = vec![at(0), at(10), at(70)];
        let rate = ops_per_minute(&entries, now());
        assert!((rate.value() - 2.0 / 60.0).abs() < f64::EPSILON);
        assert_eq!(rate.to_string(), "0.0");
    }

    #[test]
    fn test_three_in_window_rounds_up() {
        let entries = vec![at(0), at(5), at(15), at(200)];
        let rate = ops_per_minute(&entries, now());
        assert!((rate.value() - 0.05).abs() < f64::EPSILON);
        assert_eq!(rate.to_string(), "0.1");
    }

    #[test]
    fn test_cold_store_reports_zero() {
        assert_eq!(ops_per_minute(&[], now()), OpsPerMinute::ZERO);
        assert_eq!(ops_per_minute(&[at(0)], now()), OpsPerMinute::ZERO);
        assert_eq!(ops_per_minute(&[at(0)], now()).to_string(), "0.0");
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let entries = vec![at(60), at(59)];
        let rate = ops_per_minute(&entries, now());
        assert!((rate.value() - 1.0 / 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_future_entries_count() {
        let entries = vec![at(-30), at(-3600)];
        let rate = ops_per_minute(&entries, now());
        assert!((rate.value() - 2.0 / 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_custom_window() {
        let entries = vec![at(0), at(90), at(150)];
        let rate = ops_in_window(&entries, now(), Duration::seconds(120));
        assert!((rate.value() - 2.0 / 120.0).abs() < f64::EPSILON);
        assert_eq!(ops_in_window(&entries, now(), Duration::zero()), OpsPerMinute::ZERO);
    }

    #[test]
    fn test_sub_second_window_stays_finite() {
        let entries = vec![at(0), at(0)];
        let rate = ops_in_window(&entries, now(), Duration::milliseconds(500));
        assert!(rate.value().is_finite());
        assert!((rate.value() - 4.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_recompute_tracks_store_changes() {
        let provider = Arc::new(MemoryProvider::new(vec![at(0)], AuditLogSummary::default()));
        let store = Arc::new(LogStore::new(provider));
        let monitor = RateMonitor::new(store.clone());

        store.refresh().await;
        assert_eq!(monitor.recompute(now()).await, OpsPerMinute::ZERO);

        store.append(at(1)).await;
        let rate = monitor.recompute(now()).await;
        assert!((rate.value() - 2.0 / 60.0).abs() < f64::EPSILON);
        assert_eq!(monitor.current(), rate);
    }

    #[tokio::test]
    async fn test_spawned_monitor_publishes_after_mutation() {
        let live = |secs: i64| {
            AuditLogEntry::new("ops", "Heartbeat", ActionType::System, Severity::Low)
                .at(Utc::now() - Duration::seconds(secs))
        };
        let provider = Arc::new(MemoryProvider::new(
            vec![live(1), live(2), live(3)],
            AuditLogSummary::default(),
        ));
        let store = Arc::new(LogStore::new(provider));
        let (mut rx, handle) = RateMonitor::new(store.clone()).spawn();

        store.refresh().await;
        tokio::time::timeout(std::time::Duration::from_secs(2), rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert!((rx.borrow().value() - 3.0 / 60.0).abs() < f64::EPSILON);

        handle.abort();
    }

    #[tokio::test]
    async fn test_spawned_monitor_stops_when_receivers_drop() {
        let provider = Arc::new(MemoryProvider::new(vec![at(0)], AuditLogSummary::default()));
        let store = Arc::new(LogStore::new(provider));
        let (rx, handle) = RateMonitor::new(store.clone()).spawn();

        drop(rx);
        tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();

        // Only the test's handle remains once the task released its clone
        assert_eq!(Arc::strong_count(&store), 1);
    }
}
