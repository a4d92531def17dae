//! Core audit types
//!
//! All wire types use camelCase JSON serialization to match the log feed.

use crate::error::AuditError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Category of a recorded action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Create,
    Update,
    Delete,
    Login,
    Security,
    System,
}

impl ActionType {
    /// Every action type, in display order
    pub const ALL: [ActionType; 6] = [
        ActionType::Create,
        ActionType::Update,
        ActionType::Delete,
        ActionType::Login,
        ActionType::Security,
        ActionType::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Create => "create",
            ActionType::Update => "update",
            ActionType::Delete => "delete",
            ActionType::Login => "login",
            ActionType::Security => "security",
            ActionType::System => "system",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AuditError::Config(format!("Unknown action type '{}'", s)))
    }
}

/// Ordinal risk classification, ordered `Low < Medium < High < Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AuditError::Config(format!("Unknown severity '{}'", s)))
    }
}

/// Schema-less forensic payload attached to an entry
///
/// The feed sends either a JSON object or a string. A string holding a JSON
/// object is parsed; other strings are kept verbatim as `Raw`. Any other JSON
/// value is kept as-is in `Other` so it is re-sent unchanged. Object keys keep
/// their original order.
#[derive(Debug, Clone, PartialEq)]
pub enum Details {
    /// Payload that could not be parsed into an object
    Raw(String),
    /// Structured key-value payload
    Parsed(Map<String, Value>),
    /// Non-object, non-string JSON value
    Other(Value),
}

impl Details {
    /// Parse a string payload, falling back to `Raw` on failure
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Details::Parsed(map),
            _ => Details::Raw(raw.to_string()),
        }
    }

    /// Classify an arbitrary JSON value from the feed
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Details::Parsed(map),
            Value::String(s) => Details::parse(&s),
            other => Details::Other(other),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Details::Parsed(_))
    }

    /// Multi-line rendering for the detail overlay
    ///
    /// Parsed payloads are pretty-printed; raw payloads are shown as-is.
    pub fn pretty(&self) -> String {
        match self {
            Details::Parsed(map) => serde_json::to_string_pretty(map)
                .unwrap_or_else(|_| Value::Object(map.clone()).to_string()),
            Details::Other(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Details::Raw(raw) => raw.clone(),
        }
    }

    /// Single-line rendering used by the exporters
    pub fn flatten(&self) -> String {
        match self {
            Details::Parsed(map) => Value::Object(map.clone()).to_string(),
            Details::Other(value) => value.to_string(),
            Details::Raw(raw) => raw.clone(),
        }
    }
}

impl Serialize for Details {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Details::Raw(raw) => serializer.serialize_str(raw),
            Details::Parsed(map) => map.serialize(serializer),
            Details::Other(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Details {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Details::from_value)
    }
}

impl From<Map<String, Value>> for Details {
    fn from(map: Map<String, Value>) -> Self {
        Details::Parsed(map)
    }
}

/// One recorded action in the audit trail
///
/// Entries are immutable once stored; the store only ever replaces or
/// prepends whole entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Unique entry identifier
    #[serde(alias = "_id")]
    pub id: String,

    /// Actor display name (never empty)
    #[serde(deserialize_with = "non_empty_string")]
    pub user: String,

    /// Free-text description of what happened
    pub action: String,

    pub action_type: ActionType,

    pub severity: Severity,

    /// Affected object, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Outcome indicator (e.g. "success", "failure")
    #[serde(default)]
    pub status: String,

    /// Client network address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
}

fn non_empty_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = String::deserialize(deserializer)?;
    if value.trim().is_empty() {
        return Err(serde::de::Error::custom("user must not be empty"));
    }
    Ok(value)
}

impl AuditLogEntry {
    /// Create a new entry with auto-generated id, `success` status, and the
    /// current time as timestamp
    pub fn new(
        user: impl Into<String>,
        action: impl Into<String>,
        action_type: ActionType,
        severity: Severity,
    ) -> Self {
        Self {
            id: format!("log-{}", uuid::Uuid::new_v4()),
            user: user.into(),
            action: action.into(),
            action_type,
            severity,
            target: None,
            status: "success".to_string(),
            ip: None,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_details(mut self, details: Details) -> Self {
        self.details = Some(details);
        self
    }

    /// Override the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Aggregate counters computed and owned by the log feed
///
/// Never recomputed locally, so it goes stale after a live `append`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogSummary {
    #[serde(default)]
    pub total_actions: u64,
    #[serde(default)]
    pub warning_logs: u64,
    #[serde(default)]
    pub security_events: u64,
    #[serde(default)]
    pub active_users: u64,
}

/// Response of the fetch-logs collaborator call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFeed {
    pub data: Vec<AuditLogEntry>,

    #[serde(default)]
    pub summary: AuditLogSummary,
}
