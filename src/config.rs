//! Engine configuration
//!
//! Loaded from a TOML file; every field has a default so a missing file or
//! a partial file is valid.

use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// User-configurable settings for the audit engine and CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Base URL of the REST collaborator (default: http://127.0.0.1:5000/api)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout for collaborator calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of entries sent to the risk analyzer
    #[serde(default = "default_analyze_limit")]
    pub analyze_limit: usize,

    /// Trailing window for the ops/minute metric
    #[serde(default = "default_rate_window_secs")]
    pub rate_window_secs: u64,

    /// Buffer size of the store's change broadcast
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// RGB fill of the PDF table header
    #[serde(default = "default_pdf_accent")]
    pub pdf_accent: [u8; 3],

    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_analyze_limit() -> usize {
    50
}

fn default_rate_window_secs() -> u64 {
    60
}

fn default_event_capacity() -> usize {
    100
}

fn default_pdf_accent() -> [u8; 3] {
    [41, 128, 185]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            analyze_limit: default_analyze_limit(),
            rate_window_secs: default_rate_window_secs(),
            event_capacity: default_event_capacity(),
            pdf_accent: default_pdf_accent(),
            log_level: default_log_level(),
        }
    }
}

impl AuditConfig {
    /// Load configuration from a TOML file.
    /// Returns the default config if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file absent, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AuditError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: AuditConfig = toml::from_str(&content).map_err(|e| {
            AuditError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(AuditError::Config("base_url must not be empty".to_string()));
        }
        if self.analyze_limit == 0 {
            return Err(AuditError::Config("analyze_limit must be at least 1".to_string()));
        }
        if self.rate_window_secs == 0 {
            return Err(AuditError::Config("rate_window_secs must be at least 1".to_string()));
        }
        if self.event_capacity == 0 {
            return Err(AuditError::Config("event_capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rate_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.rate_window_secs as i64)
    }
}
