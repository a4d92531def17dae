//! Export of the filtered entry set
//!
//! Every format starts from the same projection (`ExportRow`) and produces
//! an `ExportArtifact`: a named, typed byte blob ready to be offered as a
//! download or written to disk.
//!
//! | Format | Filename |
//! |---|---|
//! | CSV | `audit_logs_<YYYY-MM-DD>.csv` |
//! | Spreadsheet | `audit-logs-<YYYY-MM-DD>.xlsx` |
//! | PDF | `audit-logs-<YYYY-MM-DD>.pdf` |

mod delimited;
mod pdf_report;
mod spreadsheet;

pub use delimited::write_csv;
pub use pdf_report::{paginate, write_pdf, PdfStyle, REPORT_TITLE};
pub use spreadsheet::{write_xlsx, SHEET_NAME};

use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::notice::Notice;
use crate::types::AuditLogEntry;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Column titles shared by every format
pub const COLUMNS: [&str; 8] = [
    "User",
    "Action",
    "Action Type",
    "Severity",
    "Target",
    "Status",
    "Timestamp",
    "Details",
];

/// One flattened entry, ready for any serializer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub user: String,
    pub action: String,
    pub action_type: String,
    pub severity: String,
    pub target: String,
    pub status: String,
    pub timestamp: String,
    pub details: String,
}

impl ExportRow {
    pub fn from_entry(entry: &AuditLogEntry) -> Self {
        Self {
            user: entry.user.clone(),
            action: entry.action.clone(),
            action_type: entry.action_type.to_string(),
            severity: entry.severity.to_string(),
            target: entry.target.clone().unwrap_or_default(),
            status: entry.status.clone(),
            timestamp: entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            details: entry
                .details
                .as_ref()
                .map(|d| d.flatten())
                .unwrap_or_default(),
        }
    }

    /// Cells in `COLUMNS` order
    pub fn cells(&self) -> [&str; 8] {
        [
            &self.user,
            &self.action,
            &self.action_type,
            &self.severity,
            &self.target,
            &self.status,
            &self.timestamp,
            &self.details,
        ]
    }
}

/// Project entries into export rows, preserving order
pub fn project(entries: &[AuditLogEntry]) -> Vec<ExportRow> {
    entries.iter().map(ExportRow::from_entry).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Spreadsheet,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// Download filename for an export generated at `now`
    pub fn filename(&self, now: DateTime<Utc>) -> String {
        let date = now.format("%Y-%m-%d");
        match self {
            ExportFormat::Csv => format!("audit_logs_{}.csv", date),
            ExportFormat::Spreadsheet | ExportFormat::Pdf => {
                format!("audit-logs-{}.{}", date, self.extension())
            }
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" | "spreadsheet" => Ok(ExportFormat::Spreadsheet),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(AuditError::export(other, "format not supported")),
        }
    }
}

/// A generated file, ready to be downloaded or saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its own filename
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "Export written");
        Ok(path)
    }
}

/// Result of a by-name export request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Ready(ExportArtifact),
    /// The requested format has no serializer; show the notice instead
    Unsupported(Notice),
}

/// Dispatches the filtered set to a serializer
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    pdf_style: PdfStyle,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        Self {
            pdf_style: PdfStyle {
                accent: config.pdf_accent,
                ..Default::default()
            },
        }
    }

    /// Serialize `entries` (already filtered) into `format`
    pub fn export(
        &self,
        format: ExportFormat,
        entries: &[AuditLogEntry],
        now: DateTime<Utc>,
    ) -> Result<ExportArtifact> {
        let rows = project(entries);
        let bytes = match format {
            ExportFormat::Csv => write_csv(&rows)?,
            ExportFormat::Spreadsheet => write_xlsx(&rows)?,
            ExportFormat::Pdf => write_pdf(&rows, now, &self.pdf_style)?,
        };

        tracing::debug!(format = %format, rows = rows.len(), bytes = bytes.len(), "Export generated");
        Ok(ExportArtifact {
            filename: format.filename(now),
            mime_type: format.mime_type(),
            bytes,
        })
    }

    /// Export by format name as chosen in the UI
    ///
    /// Unknown names produce an informational notice instead of an error.
    pub fn export_named(
        &self,
        name: &str,
        entries: &[AuditLogEntry],
        now: DateTime<Utc>,
    ) -> Result<ExportOutcome> {
        match name.parse::<ExportFormat>() {
            Ok(format) => self.export(format, entries, now).map(ExportOutcome::Ready),
            Err(_) => {
                tracing::info!(format = %name, "Requested export format is not implemented");
                Ok(ExportOutcome::Unsupported(Notice::info(format!(
                    "{} export is not available yet",
                    name.to_uppercase()
                ))))
            }
        }
    }
}
