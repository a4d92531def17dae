//! REST provider for the HR backend
//!
//! `GET  {base}/audit-logs`          → `{ data, summary }`
//! `POST {base}/audit-logs/analyze`  → `{ score, level, insights }`

use super::AuditLogProvider;
use crate::analyzer::{AnalyzeRequest, RiskAnalysis};
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::types::LogFeed;
use async_trait::async_trait;

const LOGS_PATH: &str = "audit-logs";
const ANALYZE_PATH: &str = "audit-logs/analyze";

/// HTTP audit log provider
pub struct HttpProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProvider {
    /// Build a provider from configuration
    pub fn new(config: &AuditConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("a3s-audit/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

async fn ensure_success(url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AuditError::Status {
        endpoint: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl AuditLogProvider for HttpProvider {
    async fn fetch_logs(&self) -> Result<LogFeed> {
        let url = self.endpoint(LOGS_PATH);
        let response = self.client.get(&url).send().await?;
        let response = ensure_success(&url, response).await?;

        let bytes = response.bytes().await?;
        let feed: LogFeed = serde_json::from_slice(&bytes)?;

        tracing::debug!(url = %url, entries = feed.data.len(), "Fetched audit logs");
        Ok(feed)
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<RiskAnalysis> {
        let url = self.endpoint(ANALYZE_PATH);
        let response = self.client.post(&url).json(request).send().await?;
        let response = ensure_success(&url, response).await?;

        let bytes = response.bytes().await?;
        let analysis: RiskAnalysis = serde_json::from_slice(&bytes)?;

        tracing::debug!(
            url = %url,
            submitted = request.logs.len(),
            score = analysis.score,
            "Risk analysis received"
        );
        Ok(analysis)
    }

    fn name(&self) -> &str {
        "http"
    }
}
