//! # a3s-audit
//!
//! Audit-log query, live monitoring, and export engine for the A3S HR console.
//!
//! ## Overview
//!
//! `a3s-audit` consumes the audit feed served by the HR backend, keeps it in
//! an explicit state container, and derives everything the "Audit Logs"
//! screen shows from it: the filtered list, the live ops/minute metric, the
//! risk analysis panel, and CSV / XLSX / PDF exports.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use a3s_audit::{filter, LogFilters, LogStore, MemoryProvider, AuditLogSummary};
//!
//! # async fn example() {
//! let provider = Arc::new(MemoryProvider::new(vec![], AuditLogSummary::default()));
//! let store = LogStore::new(provider);
//!
//! // Replace entries and summary from the provider
//! store.refresh().await;
//!
//! let entries = store.snapshot().await;
//! let visible = filter(&entries, "login", &LogFilters::default(), chrono::Utc::now());
//! println!("{} matching entries", visible.len());
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **AuditLogProvider** trait: collaborator boundary (HTTP or in-memory)
//! - **LogStore**: entries + summary, `refresh` / `append` / `subscribe`
//! - **filter**: pure predicate composition, `now` passed explicitly
//! - **RateMonitor**: ops/minute recomputed on every store change
//! - **Exporter**: shared projection feeding CSV, XLSX and PDF writers
//! - **RiskPanel**: analyze-call contract with last-good-result retention
//! - **ViewController**: display mode, filter panel, detail overlay

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod notice;
pub mod provider;
pub mod rate;
pub mod store;
pub mod types;
pub mod view;

// Re-export core types
pub use analyzer::{AnalyzeRequest, RiskAnalysis, RiskLevel, RiskPanel};
pub use config::AuditConfig;
pub use error::{AuditError, Result};
pub use export::{ExportArtifact, ExportFormat, ExportOutcome, ExportRow, Exporter};
pub use filter::{filter, DateRange, LogFilters, Selection};
pub use notice::{Notice, NoticeLevel};
pub use provider::AuditLogProvider;
pub use rate::{ops_in_window, ops_per_minute, OpsPerMinute, RateMonitor};
pub use store::{LogStore, RefreshOutcome, StoreEvent};
pub use types::{ActionType, AuditLogEntry, AuditLogSummary, Details, LogFeed, Severity};
pub use view::{ViewAction, ViewController, ViewMode};

// Re-export providers for convenience
pub use provider::http::HttpProvider;
pub use provider::memory::MemoryProvider;
