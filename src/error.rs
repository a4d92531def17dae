//! Error types for a3s-audit

use thiserror::Error;

/// Errors that can occur in the audit engine
#[derive(Debug, Error)]
pub enum AuditError {
    /// Transport-level failure talking to a collaborator
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Collaborator answered with a non-success status
    #[error("Collaborator returned {status} for {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Collaborator response was well-formed JSON but semantically invalid
    #[error("Invalid collaborator response: {0}")]
    InvalidResponse(String),

    /// Collaborator unavailable (used by in-memory providers and tests)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Export generation failure
    #[error("Failed to generate {format} export: {reason}")]
    Export { format: String, reason: String },

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuditError {
    /// Build an export error for the given format
    pub fn export(format: impl Into<String>, reason: impl ToString) -> Self {
        Self::Export {
            format: format.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;
