pub mod analyze;
pub mod export;
pub mod list;

use crate::error::{AuditError, Result};
use crate::filter::{DateRange, LogFilters};
use crate::store::{LogStore, RefreshOutcome};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// A3S Audit - query, monitor, and export audit logs
#[derive(Debug, Parser)]
#[command(name = "a3s-audit", version, about)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "a3s-audit.toml")]
    pub config: PathBuf,

    /// Override the collaborator base URL from the config file
    #[arg(long)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the filtered audit log with the live ops/minute metric
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Maximum number of rows to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Export the filtered audit log to a file
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output format (csv, xlsx, pdf)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Directory the file is written into
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Submit the most recent entries to the risk analyzer
    Analyze,
}

/// Search and filter flags shared by `list` and `export`
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Free-text search over user, action, target, and IP
    #[arg(long, default_value = "")]
    pub search: String,

    /// Action type (create, update, delete, login, security, system, all)
    #[arg(long, default_value = "all")]
    pub action_type: String,

    /// Severity (low, medium, high, critical, all)
    #[arg(long, default_value = "all")]
    pub severity: String,

    /// Exact status text, or "all"
    #[arg(long, default_value = "all")]
    pub status: String,

    /// Substring of the actor name
    #[arg(long, default_value = "")]
    pub user: String,

    /// Substring of the client address (case-sensitive)
    #[arg(long, default_value = "")]
    pub ip: String,

    /// Date window (all, today, week, month, quarter)
    #[arg(long, default_value = "all")]
    pub range: String,
}

impl FilterArgs {
    /// Parse the flags into a search term and structural filters
    pub fn parse_filters(&self) -> Result<(String, LogFilters)> {
        let filters = LogFilters {
            action_type: self.action_type.parse()?,
            severity: self.severity.parse()?,
            status: self
                .status
                .parse()
                .map_err(|e: std::convert::Infallible| AuditError::Config(e.to_string()))?,
            user: self.user.clone(),
            ip: self.ip.clone(),
            date_range: self.range.parse::<DateRange>()?,
        };
        Ok((self.search.clone(), filters))
    }
}

/// Refresh the store once, turning a failed fetch into an error
///
/// The store itself never fails a refresh; a one-shot command has nothing
/// to show without data, so it reports the failure instead.
pub async fn load(store: &LogStore) -> Result<()> {
    match store.refresh().await {
        RefreshOutcome::Failed { reason, .. } => Err(AuditError::Provider(format!(
            "Failed to fetch audit logs from {}: {}",
            store.provider_name(),
            reason
        ))),
        _ => Ok(()),
    }
}
