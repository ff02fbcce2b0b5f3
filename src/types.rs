//! Core types: calendar events and change notifications
//!
//! Field names follow the wire format the calendar UI consumes
//! (`created_at`, `type`), so serialization is snake_case.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category label of a calendar event
///
/// The set is closed: anything else is rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Reservierung,
    Veranstaltung,
    Wartung,
    Reparatur,
    Sonstiges,
}

impl EventType {
    /// All labels in display order
    pub const ALL: [EventType; 5] = [
        EventType::Reservierung,
        EventType::Veranstaltung,
        EventType::Wartung,
        EventType::Reparatur,
        EventType::Sonstiges,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Reservierung => "Reservierung",
            EventType::Veranstaltung => "Veranstaltung",
            EventType::Wartung => "Wartung",
            EventType::Reparatur => "Reparatur",
            EventType::Sonstiges => "Sonstiges",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

/// A dated calendar entry as held by the event store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Unique identifier, immutable once created
    pub id: String,

    pub title: String,

    /// Calendar day (`YYYY-MM-DD` on the wire)
    pub date: NaiveDate,

    #[serde(rename = "type")]
    pub event_type: EventType,

    #[serde(default)]
    pub description: String,

    /// Set by the store at insert, preserved across updates
    pub created_at: DateTime<Utc>,
}

/// A validated event ready to be inserted; the store assigns `created_at`
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub event_type: EventType,
    pub description: String,
}

impl NewEvent {
    /// Attach a creation timestamp, producing the stored record
    pub fn into_event(self, created_at: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent {
            id: self.id,
            title: self.title,
            date: self.date,
            event_type: self.event_type,
            description: self.description,
            created_at,
        }
    }
}

/// A validated full replacement of an existing event's mutable fields
#[derive(Debug, Clone, PartialEq)]
pub struct EventUpdate {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub event_type: EventType,
    pub description: String,
}

impl EventUpdate {
    /// Apply this update to a stored record, keeping its `created_at`
    pub fn apply_to(&self, current: &CalendarEvent) -> CalendarEvent {
        CalendarEvent {
            id: current.id.clone(),
            title: self.title.clone(),
            date: self.date,
            event_type: self.event_type,
            description: self.description.clone(),
            created_at: current.created_at,
        }
    }
}

/// Notification tag; only one kind exists today
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Changed,
}

/// Which mutation produced a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeOp::Insert => "insert",
            ChangeOp::Update => "update",
            ChangeOp::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Transient "something changed" message fanned out to live streams
///
/// `op` and `id` are hints; clients may ignore them and simply refetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub event: NotificationKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<ChangeOp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ChangeNotification {
    /// Generic notification with no operation detail
    pub fn changed() -> Self {
        Self {
            event: NotificationKind::Changed,
            op: None,
            id: None,
        }
    }

    /// Notification describing a committed mutation of one event
    pub fn mutation(op: ChangeOp, id: impl Into<String>) -> Self {
        Self {
            event: NotificationKind::Changed,
            op: Some(op),
            id: Some(id.into()),
        }
    }
}

// ─── Requests ───────────────────────────────────────────────────
//
// Raw command input as sent by clients. Every field is optional and
// non-string JSON values read as absent, so malformed input surfaces as a
// validation error rather than a deserialization failure.

/// Body of an insert command
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InsertRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,

    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub event_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
}

/// Body of an update command
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,

    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub event_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
}

/// Body of a delete command
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeleteRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
}

/// Query string of a range read
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub from: Option<String>,

    #[serde(default)]
    pub to: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        _ => Ok(None),
    }
}
