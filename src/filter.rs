//! Filter composition over the entry list
//!
//! `filter` is pure: it never touches the input and the evaluation instant
//! is always passed in. All active predicates are AND-combined; the default
//! state returns every entry in its original order.
//!
//! Text search is case-insensitive on `user`, `action` and `target`, but
//! case-sensitive on `ip`. The same asymmetry applies to the `user` and `ip`
//! structural filters. This is long-standing observable behavior and is kept
//! as-is.

use crate::types::{ActionType, AuditLogEntry, Severity};
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Literal used by the UI for "no constraint"
pub const ALL: &str = "all";

/// Either the `all` sentinel or one required value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl<T: FromStr> FromStr for Selection<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.eq_ignore_ascii_case(ALL) {
            return Ok(Selection::All);
        }
        s.parse().map(Selection::Only)
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL),
            Selection::Only(value) => value.fmt(f),
        }
    }
}

impl<T: Serialize> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selection::All => serializer.serialize_str(ALL),
            Selection::Only(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T> Deserialize<'de> for Selection<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Relative date window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    /// Same calendar date (UTC) as the evaluation instant
    Today,
    /// Last 7 days
    Week,
    /// Last calendar month
    Month,
    /// Last 3 calendar months
    Quarter,
}

impl DateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::All => "all",
            DateRange::Today => "today",
            DateRange::Week => "week",
            DateRange::Month => "month",
            DateRange::Quarter => "quarter",
        }
    }

    /// Earliest accepted timestamp for the rolling windows
    fn lower_bound(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let bound = match self {
            DateRange::All | DateRange::Today => return None,
            DateRange::Week => now.checked_sub_signed(Duration::days(7)),
            DateRange::Month => now.checked_sub_months(Months::new(1)),
            DateRange::Quarter => now.checked_sub_months(Months::new(3)),
        };
        Some(bound.unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    /// Whether `timestamp` falls inside the window ending at `now`
    ///
    /// Rolling windows have no upper bound: future-dated entries pass.
    pub fn contains(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            DateRange::All => true,
            DateRange::Today => timestamp.date_naive() == now.date_naive(),
            _ => self
                .lower_bound(now)
                .map_or(true, |bound| timestamp >= bound),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = crate::error::AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            DateRange::All,
            DateRange::Today,
            DateRange::Week,
            DateRange::Month,
            DateRange::Quarter,
        ]
        .into_iter()
        .find(|r| r.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| crate::error::AuditError::Config(format!("Unknown date range '{}'", s)))
    }
}

/// Structural filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogFilters {
    pub action_type: Selection<ActionType>,
    pub severity: Selection<Severity>,
    /// Exact match on the status text
    pub status: Selection<String>,
    /// Case-insensitive substring of the actor name; empty = any
    pub user: String,
    /// Case-sensitive substring of the address; empty = any
    pub ip: String,
    pub date_range: DateRange,
}

impl LogFilters {
    pub fn is_default(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of dimensions currently constraining the result
    pub fn active_count(&self) -> usize {
        [
            !self.action_type.is_all(),
            !self.severity.is_all(),
            !self.status.is_all(),
            !self.user.is_empty(),
            !self.ip.is_empty(),
            self.date_range != DateRange::All,
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn matches(&self, entry: &AuditLogEntry, now: DateTime<Utc>) -> bool {
        self.action_type.matches(&entry.action_type)
            && self.severity.matches(&entry.severity)
            && self.status.matches(&entry.status)
            && (self.user.is_empty() || contains_ignore_case(&entry.user, &self.user))
            && (self.ip.is_empty() || entry.ip.as_deref().is_some_and(|ip| ip.contains(&self.ip)))
            && self.date_range.contains(entry.timestamp, now)
    }
}

/// Free-text search over an entry
struct SearchTerm<'a> {
    raw: &'a str,
    lowered: String,
}

impl<'a> SearchTerm<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            lowered: raw.to_lowercase(),
        }
    }

    fn matches(&self, entry: &AuditLogEntry) -> bool {
        if self.raw.is_empty() {
            return true;
        }
        entry.user.to_lowercase().contains(&self.lowered)
            || entry.action.to_lowercase().contains(&self.lowered)
            || entry
                .target
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&self.lowered))
            || entry.ip.as_deref().is_some_and(|ip| ip.contains(self.raw))
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Apply search and filters, returning the matching entries in input order
pub fn filter(
    entries: &[AuditLogEntry],
    search_term: &str,
    filters: &LogFilters,
    now: DateTime<Utc>,
) -> Vec<AuditLogEntry> {
    let search = SearchTerm::new(search_term);
    entries
        .iter()
        .filter(|entry| search.matches(entry) && filters.matches(entry, now))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
    }

    fn entry(id: &str, user: &str, action_type: ActionType, severity: Severity) -> AuditLogEntry {
        AuditLogEntry::new(user, format!("{} action", action_type), action_type, severity)
            .with_id(id)
            .at(now())
    }

    fn fixture() -> Vec<AuditLogEntry> {
        vec![
            entry("1", "Alice Admin", ActionType::Login, Severity::Low).with_ip("192.168.1.10"),
            entry("2", "bob", ActionType::Delete, Severity::High)
                .with_target("Employee/Carol")
                .with_status("failure"),
            entry("3", "carol", ActionType::Security, Severity::Critical)
                .with_ip("10.0.0.5")
                .at(now() - Duration::days(8)),
            entry("4", "dave", ActionType::Update, Severity::Medium)
                .with_target("Training/Fire Safety")
                .at(now() - Duration::days(40)),
            entry("5", "Eve", ActionType::Create, Severity::High)
                .with_ip("fe80::AB")
                .at(now() - Duration::days(100)),
        ]
    }

    fn ids(entries: &[AuditLogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_identity_with_defaults() {
        let all = fixture();
        let out = filter(&all, "", &LogFilters::default(), now());
        assert_eq!(out, all);
    }

    #[test]
    fn test_search_is_case_insensitive_on_text_fields() {
        let all = fixture();
        assert_eq!(ids(&filter(&all, "ALICE", &LogFilters::default(), now())), ["1"]);
        assert_eq!(ids(&filter(&all, "fire safety", &LogFilters::default(), now())), ["4"]);
        // "carol" hits user of 3 and target of 2
        assert_eq!(ids(&filter(&all, "Carol", &LogFilters::default(), now())), ["2", "3"]);
        assert_eq!(ids(&filter(&all, "DELETE ACTION", &LogFilters::default(), now())), ["2"]);
    }

    #[test]
    fn test_search_is_case_sensitive_on_ip() {
        let all = fixture();
        assert_eq!(ids(&filter(&all, "fe80::AB", &LogFilters::default(), now())), ["5"]);
        assert!(filter(&all, "fe80::ab", &LogFilters::default(), now()).is_empty());
        assert_eq!(ids(&filter(&all, "10.0.0", &LogFilters::default(), now())), ["3"]);
    }

    #[test]
    fn test_severity_filter_returns_exact_match() {
        let all = vec![
            entry("l", "a", ActionType::Login, Severity::Low),
            entry("h", "b", ActionType::Login, Severity::High),
            entry("c", "c", ActionType::Login, Severity::Critical),
        ];
        let filters = LogFilters {
            severity: Selection::Only(Severity::Critical),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&all, "", &filters, now())), ["c"]);
    }

    #[test]
    fn test_status_and_action_type() {
        let all = fixture();
        let filters = LogFilters {
            status: Selection::Only("failure".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&all, "", &filters, now())), ["2"]);

        let filters = LogFilters {
            action_type: Selection::Only(ActionType::Security),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&all, "", &filters, now())), ["3"]);
    }

    #[test]
    fn test_user_and_ip_substring_filters() {
        let all = fixture();
        let filters = LogFilters {
            user: "ALI".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&all, "", &filters, now())), ["1"]);

        let filters = LogFilters {
            ip: "192.168".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&all, "", &filters, now())), ["1"]);

        let filters = LogFilters {
            ip: "FE80".to_string(),
            ..Default::default()
        };
        assert!(filter(&all, "", &filters, now()).is_empty());
    }

    #[test]
    fn test_week_window_drops_eight_day_old_entry() {
        let all = vec![
            entry("now", "a", ActionType::Login, Severity::Low),
            entry("old", "a", ActionType::Login, Severity::Low).at(now() - Duration::days(8)),
        ];
        let filters = LogFilters {
            date_range: DateRange::Week,
            ..Default::default()
        };
        assert_eq!(ids(&filter(&all, "", &filters, now())), ["now"]);
    }

    #[test]
    fn test_date_windows() {
        let all = fixture();
        let with = |range| LogFilters {
            date_range: range,
            ..Default::default()
        };
        assert_eq!(ids(&filter(&all, "", &with(DateRange::Today), now())), ["1", "2"]);
        assert_eq!(ids(&filter(&all, "", &with(DateRange::Month), now())), ["1", "2", "3"]);
        assert_eq!(
            ids(&filter(&all, "", &with(DateRange::Quarter), now())),
            ["1", "2", "3", "4"]
        );
    }

    #[test]
    fn test_rolling_windows_accept_future_entries() {
        let future = now() + Duration::days(3);
        assert!(DateRange::Week.contains(future, now()));
        assert!(DateRange::Quarter.contains(future, now()));
        assert!(!DateRange::Today.contains(future, now()));
    }

    #[test]
    fn test_today_uses_calendar_date() {
        let midnight = Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap();
        let yesterday_late = Utc.with_ymd_and_hms(2024, 5, 14, 23, 59, 59).unwrap();
        assert!(DateRange::Today.contains(midnight, now()));
        assert!(!DateRange::Today.contains(yesterday_late, now()));
    }

    #[test]
    fn test_subset_conjunction_and_idempotence() {
        let all = fixture();
        let severity = LogFilters {
            severity: Selection::Only(Severity::High),
            ..Default::default()
        };
        let window = LogFilters {
            date_range: DateRange::Quarter,
            ..Default::default()
        };
        let both = LogFilters {
            severity: Selection::Only(Severity::High),
            date_range: DateRange::Quarter,
            ..Default::default()
        };

        let combined = filter(&all, "", &both, now());
        assert!(combined.len() <= all.len());
        assert!(combined.iter().all(|e| all.contains(e)));

        let by_severity = filter(&all, "", &severity, now());
        let by_window = filter(&all, "", &window, now());
        let intersection: Vec<AuditLogEntry> = by_severity
            .iter()
            .filter(|e| by_window.contains(e))
            .cloned()
            .collect();
        assert_eq!(combined, intersection);
        assert_eq!(ids(&combined), ["2"]);

        assert_eq!(filter(&combined, "", &both, now()), combined);
    }

    #[test]
    fn test_conjunction_across_every_severity_and_type() {
        let all = fixture();
        for severity in Severity::ALL {
            for action_type in ActionType::ALL {
                let both = LogFilters {
                    severity: Selection::Only(severity),
                    action_type: Selection::Only(action_type),
                    ..Default::default()
                };
                let expected: Vec<AuditLogEntry> = all
                    .iter()
                    .filter(|e| e.severity == severity && e.action_type == action_type)
                    .cloned()
                    .collect();
                assert_eq!(filter(&all, "", &both, now()), expected);
            }
        }
    }

    #[test]
    fn test_filter_does_not_mutate_input() {
        let all = fixture();
        let copy = all.clone();
        let _ = filter(&all, "bob", &LogFilters::default(), now());
        assert_eq!(all, copy);
    }

    #[test]
    fn test_active_count() {
        let mut filters = LogFilters::default();
        assert!(filters.is_default());

        filters.severity = Selection::Only(Severity::Low);
        filters.ip = "10.".to_string();
        filters.date_range = DateRange::Week;
        assert_eq!(filters.active_count(), 3);
    }

    #[test]
    fn test_selection_parsing_and_wire_format() {
        assert_eq!("all".parse::<Selection<Severity>>().unwrap(), Selection::All);
        assert_eq!(
            "high".parse::<Selection<Severity>>().unwrap(),
            Selection::Only(Severity::High)
        );
        assert!("bogus".parse::<Selection<ActionType>>().is_err());

        let filters: LogFilters = serde_json::from_str(
            r#"{"actionType": "all", "severity": "critical", "status": "success", "dateRange": "month"}"#,
        )
        .unwrap();
        assert!(filters.action_type.is_all());
        assert_eq!(filters.severity, Selection::Only(Severity::Critical));
        assert_eq!(filters.status, Selection::Only("success".to_string()));
        assert_eq!(filters.date_range, DateRange::Month);
        assert!(filters.user.is_empty());

        let json = serde_json::to_string(&LogFilters::default()).unwrap();
        assert!(json.contains("\"actionType\":\"all\""));
        assert!(json.contains("\"dateRange\":\"all\""));
    }
}
