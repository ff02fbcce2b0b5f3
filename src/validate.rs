//! Input validation for event commands
//!
//! Every check here runs before the store is touched. A failure is a
//! [`ScheduleError::Validation`] carrying the message returned to the client.

use crate::error::{Result, ScheduleError};
use crate::types::{
    DeleteRequest, EventType, EventUpdate, InsertRequest, NewEvent, RangeQuery, UpdateRequest,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Minimum title length, counted in characters after trimming
pub const MIN_TITLE_LEN: usize = 2;

/// Tunable parts of the validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Largest accepted range query span in days, inclusive of both ends;
    /// `0` disables the limit
    pub max_range_days: u32,

    /// Require update/delete ids to be UUID v4 strings
    pub require_uuid_ids: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            max_range_days: 120,
            require_uuid_ids: false,
        }
    }
}

fn invalid(msg: &str) -> ScheduleError {
    ScheduleError::Validation(msg.to_string())
}

fn trimmed(raw: Option<&String>) -> &str {
    raw.map(|s| s.trim()).unwrap_or_default()
}

/// Whether `raw` has the exact `YYYY-MM-DD` digit layout
fn has_date_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parse a `YYYY-MM-DD` string that must name a real calendar day
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    if !has_date_shape(raw) {
        return Err(invalid("date must be YYYY-MM-DD"));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| invalid("date is not a valid calendar date"))
}

/// Trim a title and enforce the minimum length
pub fn validate_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.chars().count() < MIN_TITLE_LEN {
        return Err(invalid("title is too short"));
    }
    Ok(title.to_string())
}

/// Map a label onto the closed set of event types
pub fn parse_event_type(raw: &str) -> Result<EventType> {
    raw.parse().map_err(|_| invalid("type is invalid"))
}

/// Check an update/delete id: non-empty after trimming, optionally UUID v4
pub fn validate_id(raw: Option<&String>, policy: &ValidationPolicy) -> Result<String> {
    let id = trimmed(raw);
    if id.is_empty() {
        return Err(invalid("id required"));
    }
    if policy.require_uuid_ids {
        let is_v4 = uuid::Uuid::parse_str(id)
            .map(|u| u.get_version_num() == 4)
            .unwrap_or(false);
        if !is_v4 {
            return Err(invalid("id is invalid"));
        }
    }
    Ok(id.to_string())
}

/// Shared field checks for insert and update
struct EventFields {
    title: String,
    date: NaiveDate,
    event_type: EventType,
    description: String,
}

fn validate_fields(
    title: Option<&String>,
    date: Option<&String>,
    event_type: Option<&String>,
    description: Option<&String>,
) -> Result<EventFields> {
    let date = parse_date(trimmed(date))?;
    let event_type = parse_event_type(event_type.map(String::as_str).unwrap_or_default())?;
    let title = validate_title(trimmed(title))?;
    Ok(EventFields {
        title,
        date,
        event_type,
        description: description.cloned().unwrap_or_default(),
    })
}

/// Validate an insert command and assign the new event's id
pub fn validate_insert(req: &InsertRequest) -> Result<NewEvent> {
    if trimmed(req.title.as_ref()).is_empty()
        || trimmed(req.date.as_ref()).is_empty()
        || req.event_type.as_deref().unwrap_or_default().is_empty()
    {
        return Err(invalid("title, date, type are required"));
    }

    let fields = validate_fields(
        req.title.as_ref(),
        req.date.as_ref(),
        req.event_type.as_ref(),
        req.description.as_ref(),
    )?;

    Ok(NewEvent {
        id: uuid::Uuid::new_v4().to_string(),
        title: fields.title,
        date: fields.date,
        event_type: fields.event_type,
        description: fields.description,
    })
}

/// Validate an update command
pub fn validate_update(req: &UpdateRequest, policy: &ValidationPolicy) -> Result<EventUpdate> {
    if trimmed(req.id.as_ref()).is_empty()
        || trimmed(req.title.as_ref()).is_empty()
        || trimmed(req.date.as_ref()).is_empty()
        || req.event_type.as_deref().unwrap_or_default().is_empty()
    {
        return Err(invalid("id, title, date, type are required"));
    }

    let id = validate_id(req.id.as_ref(), policy)?;
    let fields = validate_fields(
        req.title.as_ref(),
        req.date.as_ref(),
        req.event_type.as_ref(),
        req.description.as_ref(),
    )?;

    Ok(EventUpdate {
        id,
        title: fields.title,
        date: fields.date,
        event_type: fields.event_type,
        description: fields.description,
    })
}

/// Validate a delete command, returning the trimmed id
pub fn validate_delete(req: &DeleteRequest, policy: &ValidationPolicy) -> Result<String> {
    validate_id(req.id.as_ref(), policy)
}

/// Validate a range query, ordering the bounds and enforcing the span limit
pub fn validate_range(query: &RangeQuery, policy: &ValidationPolicy) -> Result<(NaiveDate, NaiveDate)> {
    let from = trimmed(query.from.as_ref());
    let to = trimmed(query.to.as_ref());
    if from.is_empty() || to.is_empty() {
        return Err(invalid("from/to required"));
    }

    let (Ok(mut from), Ok(mut to)) = (parse_date(from), parse_date(to)) else {
        return Err(invalid("from/to must be YYYY-MM-DD"));
    };

    if from > to {
        std::mem::swap(&mut from, &mut to);
    }

    if policy.max_range_days > 0 {
        let span = (to - from).num_days() + 1;
        if span > i64::from(policy.max_range_days) {
            return Err(ScheduleError::Validation(format!(
                "range too large (max {} days)",
                policy.max_range_days
            )));
        }
    }

    Ok((from, to))
}
