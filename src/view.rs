//! Audit log screen state machine
//!
//! Holds UI-only state: the display mode, the filter panel toggle, the
//! detail overlay, and the current search/filter values. It never mutates
//! entries; the visible list is derived on read.

use crate::filter::{filter, DateRange, LogFilters, Selection};
use crate::notice::Notice;
use crate::types::{ActionType, AuditLogEntry, Severity};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Mutually exclusive display modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Table,
    Timeline,
    Analytics,
}

/// User-triggered transitions
#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    SetMode(ViewMode),
    ToggleFilterPanel,
    SetSearch(String),
    SetActionType(Selection<ActionType>),
    SetSeverity(Selection<Severity>),
    SetStatus(Selection<String>),
    SetUser(String),
    SetIp(String),
    SetDateRange(DateRange),
    ResetFilters,
    /// Open the detail overlay for an entry
    Select(AuditLogEntry),
    CloseDetail,
    /// Click landed outside the detail overlay
    ClickOutside,
}

/// State of the audit log screen
#[derive(Debug, Default)]
pub struct ViewController {
    mode: ViewMode,
    filter_panel_open: bool,
    search_term: String,
    filters: LogFilters,
    selected: Option<AuditLogEntry>,
    notices: VecDeque<Notice>,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one user action
    pub fn apply(&mut self, action: ViewAction) {
        match action {
            ViewAction::SetMode(mode) => self.mode = mode,
            ViewAction::ToggleFilterPanel => self.filter_panel_open = !self.filter_panel_open,
            ViewAction::SetSearch(term) => self.search_term = term,
            ViewAction::SetActionType(selection) => self.filters.action_type = selection,
            ViewAction::SetSeverity(selection) => self.filters.severity = selection,
            ViewAction::SetStatus(selection) => self.filters.status = selection,
            ViewAction::SetUser(user) => self.filters.user = user,
            ViewAction::SetIp(ip) => self.filters.ip = ip,
            ViewAction::SetDateRange(range) => self.filters.date_range = range,
            ViewAction::ResetFilters => {
                self.filters = LogFilters::default();
                self.search_term.clear();
            }
            ViewAction::Select(entry) => {
                tracing::trace!(entry_id = %entry.id, "Detail overlay opened");
                self.selected = Some(entry);
            }
            ViewAction::CloseDetail | ViewAction::ClickOutside => self.selected = None,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_filter_panel_open(&self) -> bool {
        self.filter_panel_open
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn filters(&self) -> &LogFilters {
        &self.filters
    }

    /// Badge count for the filter toggle
    pub fn active_filter_count(&self) -> usize {
        self.filters.active_count() + usize::from(!self.search_term.is_empty())
    }

    pub fn selected(&self) -> Option<&AuditLogEntry> {
        self.selected.as_ref()
    }

    /// Entries visible under the current search and filters
    pub fn visible(&self, entries: &[AuditLogEntry], now: DateTime<Utc>) -> Vec<AuditLogEntry> {
        filter(entries, &self.search_term, &self.filters, now)
    }

    /// Pretty-printed details of the selected entry
    ///
    /// Parsed payloads are indented JSON; unparseable ones are shown raw.
    pub fn detail_text(&self) -> Option<String> {
        self.selected
            .as_ref()
            .and_then(|entry| entry.details.as_ref())
            .map(|details| details.pretty())
    }

    /// Queue a notice for the presentation layer
    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    /// Drain queued notices in arrival order
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }
}
