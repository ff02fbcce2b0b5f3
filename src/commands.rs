//! Event command handlers
//!
//! Each mutating command validates its input, makes exactly one store
//! call, and publishes exactly one notification once the store confirmed
//! the change. Validation failures, not-found outcomes and store errors
//! all return before anything is published, so a notification always
//! implies a committed mutation.

use crate::bus::NotificationBus;
use crate::error::{Result, ScheduleError};
use crate::store::{was_deleted, EventStore};
use crate::types::{
    CalendarEvent, ChangeNotification, ChangeOp, DeleteRequest, InsertRequest, RangeQuery,
    UpdateRequest,
};
use crate::validate::{self, ValidationPolicy};
use std::sync::Arc;

/// Coordinates validation, the event store and the notification bus
#[derive(Clone)]
pub struct EventCommands {
    store: Arc<dyn EventStore>,
    bus: NotificationBus,
    policy: ValidationPolicy,
}

impl EventCommands {
    pub fn new(store: Arc<dyn EventStore>, bus: NotificationBus, policy: ValidationPolicy) -> Self {
        Self { store, bus, policy }
    }

    /// The bus notifications are published on
    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn store(&self) -> &dyn EventStore {
        self.store.as_ref()
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Events in the requested range, ascending by date. Never publishes.
    pub async fn range(&self, query: &RangeQuery) -> Result<Vec<CalendarEvent>> {
        let (from, to) = validate::validate_range(query, &self.policy)?;
        let mut events = self.store.range(from, to).await?;
        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    /// Create an event and announce it
    pub async fn insert(&self, req: &InsertRequest) -> Result<CalendarEvent> {
        let event = validate::validate_insert(req)?;
        let created = self.store.insert(event).await?;

        tracing::info!(id = %created.id, date = %created.date, "Event inserted");
        self.bus
            .publish(&ChangeNotification::mutation(ChangeOp::Insert, &created.id));

        Ok(created)
    }

    /// Replace an existing event's fields and announce it
    pub async fn update(&self, req: &UpdateRequest) -> Result<CalendarEvent> {
        let update = validate::validate_update(req, &self.policy)?;
        let id = update.id.clone();

        let Some(updated) = self.store.update(update).await? else {
            tracing::debug!(id = %id, "Update target not found");
            return Err(ScheduleError::NotFound(id));
        };

        tracing::info!(id = %updated.id, date = %updated.date, "Event updated");
        self.bus
            .publish(&ChangeNotification::mutation(ChangeOp::Update, &updated.id));

        Ok(updated)
    }

    /// Delete an event and announce it
    pub async fn delete(&self, req: &DeleteRequest) -> Result<()> {
        let id = validate::validate_delete(req, &self.policy)?;

        if !was_deleted(self.store.delete(&id).await)? {
            tracing::debug!(id = %id, "Delete target not found");
            return Err(ScheduleError::NotFound(id));
        }

        tracing::info!(id = %id, "Event deleted");
        self.bus
            .publish(&ChangeNotification::mutation(ChangeOp::Delete, &id));

        Ok(())
    }

    /// Announce a change made outside this process (e.g., a spreadsheet edit)
    pub fn signal_external_change(&self) -> usize {
        let delivered = self.bus.publish(&ChangeNotification::changed());
        tracing::info!(delivered, "External change signalled");
        delivered
    }
}
