//! Log feed provider trait: the collaborator boundary
//!
//! The log feed and the risk analyzer live on the server. Everything in
//! this crate talks to them through `AuditLogProvider`, so the store and
//! the analyzer panel can run against HTTP, memory, or a test double.

use crate::analyzer::{AnalyzeRequest, RiskAnalysis};
use crate::error::Result;
use crate::types::LogFeed;
use async_trait::async_trait;

pub mod http;
pub mod memory;

/// Core trait for audit log collaborators
#[async_trait]
pub trait AuditLogProvider: Send + Sync {
    /// Fetch the current entry list together with its summary
    async fn fetch_logs(&self) -> Result<LogFeed>;

    /// Submit entries for anomaly scoring
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<RiskAnalysis>;

    /// Provider name (e.g., "http", "memory")
    fn name(&self) -> &str;
}
