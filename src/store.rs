//! Log store built on a pluggable provider
//!
//! `LogStore` holds the current entry list and summary. It is an explicit
//! container handed to its consumers (usually behind an `Arc`), with a
//! read / subscribe / mutate API:
//!
//! - `refresh` replaces entries and summary together from the provider
//! - `append` pushes one live entry at the head
//! - `snapshot` / `summary` read the current state
//! - `subscribe` notifies listeners after every mutation

use crate::config::AuditConfig;
use crate::provider::AuditLogProvider;
use crate::types::{AuditLogEntry, AuditLogSummary};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Change notification emitted after each store mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Entries and summary were replaced by a refresh
    Refreshed { generation: u64, entries: usize },
    /// One live entry was prepended
    Appended { id: String },
}

/// What a `refresh` call did to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was applied
    Applied { generation: u64, entries: usize },
    /// A newer refresh was issued while this one was pending; the response
    /// was discarded
    Superseded { generation: u64, latest: u64 },
    /// The provider failed; prior state is unchanged
    Failed { generation: u64, reason: String },
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied { .. })
    }
}

#[derive(Default)]
struct LogState {
    entries: Arc<Vec<AuditLogEntry>>,
    summary: AuditLogSummary,
}

/// Shared audit log state backed by a provider
///
/// Thread-safe via an internal async lock. Snapshots are copy-on-write:
/// a snapshot taken before a mutation keeps its contents.
pub struct LogStore {
    provider: Arc<dyn AuditLogProvider>,

    state: RwLock<LogState>,

    /// Last issued refresh generation
    generation: AtomicU64,

    events: broadcast::Sender<StoreEvent>,
}

impl LogStore {
    /// Create an empty store with the default event capacity
    pub fn new(provider: Arc<dyn AuditLogProvider>) -> Self {
        Self::with_capacity(provider, 100)
    }

    /// Create an empty store sized from configuration
    pub fn with_config(provider: Arc<dyn AuditLogProvider>, config: &AuditConfig) -> Self {
        Self::with_capacity(provider, config.event_capacity)
    }

    fn with_capacity(provider: Arc<dyn AuditLogProvider>, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            provider,
            state: RwLock::new(LogState::default()),
            generation: AtomicU64::new(0),
            events,
        }
    }

    /// Get the provider name
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Shared handle to the underlying provider
    pub fn provider(&self) -> Arc<dyn AuditLogProvider> {
        Arc::clone(&self.provider)
    }

    /// Fetch from the provider and replace entries and summary
    ///
    /// Each call takes a new generation number. A response is applied only
    /// if no newer refresh was issued while it was in flight. Failures are
    /// logged and leave the store untouched; they are never returned as
    /// errors.
    pub async fn refresh(&self) -> RefreshOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let feed = match self.provider.fetch_logs().await {
            Ok(feed) => feed,
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    generation,
                    error = %e,
                    "Failed to refresh audit logs"
                );
                return RefreshOutcome::Failed {
                    generation,
                    reason: e.to_string(),
                };
            }
        };

        let entries = feed.data.len();
        {
            let mut state = self.state.write().await;
            let latest = self.generation.load(Ordering::SeqCst);
            if latest != generation {
                tracing::debug!(generation, latest, "Discarding superseded refresh");
                return RefreshOutcome::Superseded { generation, latest };
            }
            state.entries = Arc::new(feed.data);
            state.summary = feed.summary;
        }

        tracing::info!(generation, entries, "Audit logs refreshed");
        let _ = self.events.send(StoreEvent::Refreshed {
            generation,
            entries,
        });

        RefreshOutcome::Applied {
            generation,
            entries,
        }
    }

    /// Prepend a live entry
    ///
    /// The entry goes to the head regardless of its timestamp; the list is
    /// in arrival order. The summary is not touched.
    pub async fn append(&self, entry: AuditLogEntry) {
        let id = entry.id.clone();
        {
            let mut state = self.state.write().await;
            Arc::make_mut(&mut state.entries).insert(0, entry);
        }

        tracing::debug!(entry_id = %id, "Live audit entry appended");
        let _ = self.events.send(StoreEvent::Appended { id });
    }

    /// Current entry list
    pub async fn snapshot(&self) -> Arc<Vec<AuditLogEntry>> {
        Arc::clone(&self.state.read().await.entries)
    }

    /// Current summary, as last delivered by the provider
    pub async fn summary(&self) -> AuditLogSummary {
        self.state.read().await.summary.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Last issued refresh generation (0 before the first refresh)
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Subscribe to store mutations
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}
