//! Event store trait: the boundary to durable storage
//!
//! The command handlers only ever talk to an `EventStore`. Backends differ
//! in how they report a delete (a flag, an affected-row count, or just the
//! absence of an error); [`was_deleted`] folds all of those into one answer.

use crate::error::{Result, ScheduleError};
use crate::types::{CalendarEvent, EventUpdate, NewEvent};
use async_trait::async_trait;
use chrono::NaiveDate;

pub mod file;
pub mod memory;

pub use file::FileEventStore;
pub use memory::MemoryEventStore;

/// How a backend reported the outcome of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Backend answered with an explicit flag
    Flag(bool),

    /// Backend answered with the number of rows it removed
    Affected(u64),

    /// Backend returned without error; missing ids are reported as
    /// [`ScheduleError::NotFound`] instead
    Completed,
}

/// Normalize a delete result to "was something deleted"
///
/// A not-found error counts as `false`; any other error is propagated.
pub fn was_deleted(result: Result<DeleteOutcome>) -> Result<bool> {
    match result {
        Ok(DeleteOutcome::Flag(deleted)) => Ok(deleted),
        Ok(DeleteOutcome::Affected(rows)) => Ok(rows > 0),
        Ok(DeleteOutcome::Completed) => Ok(true),
        Err(ScheduleError::NotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Core trait for event storage backends
///
/// Implementations own id uniqueness and `created_at` handling. Errors
/// other than [`ScheduleError::NotFound`] are treated as the store being
/// unavailable.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events whose date falls within `from..=to`, sorted ascending by date
    async fn range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<CalendarEvent>>;

    /// Append a new event, stamping `created_at`
    async fn insert(&self, event: NewEvent) -> Result<CalendarEvent>;

    /// Replace an event's mutable fields, preserving `created_at`
    ///
    /// Returns `None` when no event has the given id.
    async fn update(&self, update: EventUpdate) -> Result<Option<CalendarEvent>>;

    /// Delete an event by id
    async fn delete(&self, id: &str) -> Result<DeleteOutcome>;

    /// Backend name (e.g., "memory", "file")
    fn name(&self) -> &str;

    /// Health check; returns true if the backend is reachable
    async fn health(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Rows with a date inside `from..=to`, sorted ascending by date
///
/// The sort is stable, so same-day events keep their row order.
pub(crate) fn select_range<'a>(
    rows: impl IntoIterator<Item = &'a CalendarEvent>,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<CalendarEvent> {
    let mut out: Vec<CalendarEvent> = rows
        .into_iter()
        .filter(|e| e.date >= from && e.date <= to)
        .cloned()
        .collect();
    out.sort_by_key(|e| e.date);
    out
}
