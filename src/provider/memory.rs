//! In-memory provider for testing and offline use
//!
//! Serves a fixed feed, and can be scripted with per-call delays and
//! failures to exercise the store's refresh ordering.

use super::AuditLogProvider;
use crate::analyzer::{AnalyzeRequest, RiskAnalysis};
use crate::error::{AuditError, Result};
use crate::types::{AuditLogEntry, AuditLogSummary, LogFeed};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

/// One scripted answer to `fetch_logs`
struct ScriptedFetch {
    /// `None` answers with a provider error
    feed: Option<LogFeed>,
    delay: Duration,
}

/// In-memory audit log provider
#[derive(Default)]
pub struct MemoryProvider {
    feed: RwLock<LogFeed>,
    script: Mutex<VecDeque<ScriptedFetch>>,
    analysis: RwLock<Option<RiskAnalysis>>,
    last_request: Mutex<Option<AnalyzeRequest>>,
    fetches: AtomicUsize,
}

impl MemoryProvider {
    /// Create a provider serving the given entries and summary
    pub fn new(entries: Vec<AuditLogEntry>, summary: AuditLogSummary) -> Self {
        Self {
            feed: RwLock::new(LogFeed {
                data: entries,
                summary,
            }),
            ..Default::default()
        }
    }

    /// Replace the feed served once the script is exhausted
    pub fn set_feed(&self, entries: Vec<AuditLogEntry>, summary: AuditLogSummary) -> Result<()> {
        let mut feed = self.feed.write().map_err(|e| {
            AuditError::Provider(format!("Failed to acquire feed lock: {}", e))
        })?;
        *feed = LogFeed {
            data: entries,
            summary,
        };
        Ok(())
    }

    /// Queue a one-shot answer, delivered after `delay`
    pub fn script_feed(&self, feed: LogFeed, delay: Duration) -> Result<()> {
        self.push_script(ScriptedFetch {
            feed: Some(feed),
            delay,
        })
    }

    /// Queue a one-shot failure, delivered after `delay`
    pub fn script_failure(&self, delay: Duration) -> Result<()> {
        self.push_script(ScriptedFetch { feed: None, delay })
    }

    /// Set the analysis returned by `analyze`; `None` makes it fail
    pub fn set_analysis(&self, analysis: Option<RiskAnalysis>) -> Result<()> {
        let mut slot = self.analysis.write().map_err(|e| {
            AuditError::Provider(format!("Failed to acquire analysis lock: {}", e))
        })?;
        *slot = analysis;
        Ok(())
    }

    /// The most recent request passed to `analyze`
    pub fn last_request(&self) -> Option<AnalyzeRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }

    /// Number of `fetch_logs` calls served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn push_script(&self, step: ScriptedFetch) -> Result<()> {
        let mut script = self.script.lock().map_err(|e| {
            AuditError::Provider(format!("Failed to acquire script lock: {}", e))
        })?;
        script.push_back(step);
        Ok(())
    }

    fn next_script(&self) -> Result<Option<ScriptedFetch>> {
        let mut script = self.script.lock().map_err(|e| {
            AuditError::Provider(format!("Failed to acquire script lock: {}", e))
        })?;
        Ok(script.pop_front())
    }
}

#[async_trait]
impl AuditLogProvider for MemoryProvider {
    async fn fetch_logs(&self) -> Result<LogFeed> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(step) = self.next_script()? {
            if !step.delay.is_zero() {
                tokio::time::sleep(step.delay).await;
            }
            return step
                .feed
                .ok_or_else(|| AuditError::Provider("log feed unavailable".to_string()));
        }

        let feed = self.feed.read().map_err(|e| {
            AuditError::Provider(format!("Failed to acquire feed lock: {}", e))
        })?;
        Ok(feed.clone())
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<RiskAnalysis> {
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        let analysis = self.analysis.read().map_err(|e| {
            AuditError::Provider(format!("Failed to acquire analysis lock: {}", e))
        })?;
        analysis
            .clone()
            .ok_or_else(|| AuditError::Provider("risk analyzer unavailable".to_string()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
