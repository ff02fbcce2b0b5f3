//! In-memory event store
//!
//! Rows live in a `Vec` in insertion order. Lost on restart; used by tests
//! and ephemeral deployments.

use super::{select_range, DeleteOutcome, EventStore};
use crate::error::{Result, ScheduleError};
use crate::types::{CalendarEvent, EventUpdate, NewEvent};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryEventStore {
    rows: RwLock<Vec<CalendarEvent>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `events`
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            rows: RwLock::new(events),
        }
    }

    /// Number of stored events
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Look up a single event by id
    pub async fn get(&self, id: &str) -> Option<CalendarEvent> {
        self.rows.read().await.iter().find(|e| e.id == id).cloned()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<CalendarEvent>> {
        Ok(select_range(self.rows.read().await.iter(), from, to))
    }

    async fn insert(&self, event: NewEvent) -> Result<CalendarEvent> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|e| e.id == event.id) {
            return Err(ScheduleError::Store(format!(
                "duplicate event id: {}",
                event.id
            )));
        }
        let stored = event.into_event(Utc::now());
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, update: EventUpdate) -> Result<Option<CalendarEvent>> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.iter_mut().find(|e| e.id == update.id) else {
            return Ok(None);
        };
        *row = update.apply_to(row);
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: &str) -> Result<DeleteOutcome> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|e| e.id != id);
        Ok(DeleteOutcome::Flag(rows.len() < before))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
