//! Risk analyzer collaborator contract
//!
//! The scoring model runs server-side. This module builds the request from
//! the store's current order, validates the answer, and keeps the last good
//! analysis on screen when a call fails.

use crate::error::{AuditError, Result};
use crate::notice::Notice;
use crate::provider::AuditLogProvider;
use crate::types::AuditLogEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default number of entries submitted per analysis
pub const DEFAULT_ANALYZE_LIMIT: usize = 50;

/// Highest score the analyzer may return
pub const MAX_SCORE: f64 = 100.0;

/// Request body for the analyze call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub logs: Vec<AuditLogEntry>,
}

impl AnalyzeRequest {
    /// Take the first `limit` entries in the order given
    ///
    /// The store holds entries in arrival order; they are not re-sorted.
    pub fn from_entries(entries: &[AuditLogEntry], limit: usize) -> Self {
        Self {
            logs: entries.iter().take(limit).cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Critical,
    Warning,
    Normal,
}

/// Analyzer verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    /// Risk score in `0..=100`, possibly fractional
    pub score: f64,
    pub level: RiskLevel,
    #[serde(default)]
    pub insights: Vec<String>,
}

impl RiskAnalysis {
    pub fn validate(self) -> Result<Self> {
        if !(0.0..=MAX_SCORE).contains(&self.score) {
            return Err(AuditError::InvalidResponse(format!(
                "risk score {} outside 0..={}",
                self.score, MAX_SCORE
            )));
        }
        Ok(self)
    }
}

/// Analysis panel state
pub struct RiskPanel {
    provider: Arc<dyn AuditLogProvider>,
    limit: usize,
    analysis: Option<RiskAnalysis>,
}

impl RiskPanel {
    pub fn new(provider: Arc<dyn AuditLogProvider>) -> Self {
        Self::with_limit(provider, DEFAULT_ANALYZE_LIMIT)
    }

    pub fn with_limit(provider: Arc<dyn AuditLogProvider>, limit: usize) -> Self {
        Self {
            provider,
            limit: limit.max(1),
            analysis: None,
        }
    }

    /// Whether the analyze trigger is enabled for this entry set
    pub fn can_analyze(&self, entries: &[AuditLogEntry]) -> bool {
        !entries.is_empty()
    }

    /// Last successful analysis, if any
    pub fn analysis(&self) -> Option<&RiskAnalysis> {
        self.analysis.as_ref()
    }

    /// Submit the current entries for scoring
    ///
    /// On failure the previous analysis is kept and an error notice is
    /// returned for display.
    pub async fn analyze(
        &mut self,
        entries: &[AuditLogEntry],
    ) -> std::result::Result<&RiskAnalysis, Notice> {
        if !self.can_analyze(entries) {
            return Err(Notice::info("No audit logs to analyze"));
        }

        let request = AnalyzeRequest::from_entries(entries, self.limit);
        let result = self
            .provider
            .analyze(&request)
            .await
            .and_then(RiskAnalysis::validate);

        match result {
            Ok(analysis) => {
                tracing::info!(
                    submitted = request.logs.len(),
                    score = analysis.score,
                    level = ?analysis.level,
                    "Risk analysis updated"
                );
                Ok(self.analysis.insert(analysis))
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Risk analysis failed"
                );
                Err(Notice::error(format!("Failed to analyze logs: {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::memory::MemoryProvider;
    use crate::types::{ActionType, Severity};

    fn entries(n: usize) -> Vec<AuditLogEntry> {
        (0..n)
            .map(|i| {
                AuditLogEntry::new(format!("user{}", i), "Viewed", ActionType::System, Severity::Low)
                    .with_id(format!("e{}", i))
            })
            .collect()
    }

    fn verdict(score: f64) -> RiskAnalysis {
        RiskAnalysis {
            score,
            level: RiskLevel::Warning,
            insights: vec!["Burst of failed logins".to_string()],
        }
    }

    #[test]
    fn test_request_takes_first_entries_in_order() {
        let all = entries(80);
        let request = AnalyzeRequest::from_entries(&all, DEFAULT_ANALYZE_LIMIT);
        assert_eq!(request.logs.len(), 50);
        assert_eq!(request.logs[0].id, "e0");
        assert_eq!(request.logs[49].id, "e49");

        let few = AnalyzeRequest::from_entries(&all[..3], DEFAULT_ANALYZE_LIMIT);
        assert_eq!(few.logs.len(), 3);
    }

    #[test]
    fn test_level_wire_format() {
        let parsed: RiskAnalysis =
            serde_json::from_str(r#"{"score": 91, "level": "CRITICAL", "insights": ["x"]}"#)
                .unwrap();
        assert_eq!(parsed.level, RiskLevel::Critical);
        assert_eq!(serde_json::to_string(&RiskLevel::Normal).unwrap(), "\"NORMAL\"");
    }

    #[test]
    fn test_validate_rejects_out_of_range_score() {
        assert!(verdict(100.0).validate().is_ok());
        assert!(matches!(
            verdict(100.5).validate(),
            Err(AuditError::InvalidResponse(_))
        ));
        assert!(verdict(-1.0).validate().is_err());
        assert!(verdict(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_fractional_score_is_accepted() {
        let parsed: RiskAnalysis =
            serde_json::from_str(r#"{"score": 72.5, "level": "WARNING", "insights": []}"#)
                .unwrap();
        let analysis = parsed.validate().unwrap();
        assert_eq!(analysis.score, 72.5);
        assert_eq!(analysis.level, RiskLevel::Warning);
    }

    #[tokio::test]
    async fn test_disabled_on_empty_set() {
        let provider = Arc::new(MemoryProvider::default());
        let mut panel = RiskPanel::new(provider.clone());

        assert!(!panel.can_analyze(&[]));
        let notice = panel.analyze(&[]).await.unwrap_err();
        assert!(!notice.is_error());
        assert!(provider.last_request().is_none());
    }

    #[tokio::test]
    async fn test_success_then_failure_keeps_previous_analysis() {
        let provider = Arc::new(MemoryProvider::default());
        provider.set_analysis(Some(verdict(64.0))).unwrap();
        let mut panel = RiskPanel::new(provider.clone());
        let logs = entries(60);

        let analysis = panel.analyze(&logs).await.unwrap();
        assert_eq!(analysis.score, 64.0);
        assert_eq!(provider.last_request().unwrap().logs.len(), 50);

        provider.set_analysis(None).unwrap();
        let notice = panel.analyze(&logs).await.unwrap_err();
        assert!(notice.is_error());
        assert_eq!(panel.analysis().map(|a| a.score), Some(64.0));
    }

    #[tokio::test]
    async fn test_invalid_score_surfaces_error() {
        let provider = Arc::new(MemoryProvider::default());
        provider.set_analysis(Some(verdict(150.0))).unwrap();
        let mut panel = RiskPanel::with_limit(provider, 10);

        let notice = panel.analyze(&entries(2)).await.unwrap_err();
        assert!(notice.is_error());
        assert!(panel.analysis().is_none());
    }
}
