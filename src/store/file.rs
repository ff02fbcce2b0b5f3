//! JSON file event store
//!
//! Keeps events as an ordered list of rows, the way a spreadsheet tab does:
//! inserts append, updates overwrite a row in place, deletes remove a row
//! by index. The whole table is rewritten atomically (temp file + rename)
//! after each mutation, and the in-memory copy is only replaced once the
//! write succeeded.

use super::{select_range, DeleteOutcome, EventStore};
use crate::error::{Result, ScheduleError};
use crate::types::{CalendarEvent, EventUpdate, NewEvent};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub struct FileEventStore {
    path: PathBuf,
    rows: Mutex<Vec<CalendarEvent>>,
}

impl FileEventStore {
    /// Open the store at `path`, loading existing rows if the file exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let rows = if path.exists() {
            let json = std::fs::read_to_string(&path).map_err(|e| {
                ScheduleError::Store(format!(
                    "Failed to read event file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            serde_json::from_str::<Vec<CalendarEvent>>(&json).map_err(|e| {
                ScheduleError::Store(format!(
                    "Failed to parse event file {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            Vec::new()
        };

        tracing::debug!(path = %path.display(), count = rows.len(), "Event file loaded");

        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, rows: &[CalendarEvent]) -> Result<()> {
        let json = serde_json::to_string_pretty(rows)?;
        let tmp_path = self.path.with_extension("tmp");

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ScheduleError::Store(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        tokio::fs::write(&tmp_path, json).await.map_err(|e| {
            ScheduleError::Store(format!(
                "Failed to write event file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            ScheduleError::Store(format!(
                "Failed to rename event file {} → {}: {}",
                tmp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %self.path.display(), count = rows.len(), "Event file saved");
        Ok(())
    }
}

#[async_trait]
impl EventStore for FileEventStore {
    async fn range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<CalendarEvent>> {
        Ok(select_range(self.rows.lock().await.iter(), from, to))
    }

    async fn insert(&self, event: NewEvent) -> Result<CalendarEvent> {
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|e| e.id == event.id) {
            return Err(ScheduleError::Store(format!(
                "duplicate event id: {}",
                event.id
            )));
        }

        let stored = event.into_event(Utc::now());
        let mut next = rows.clone();
        next.push(stored.clone());
        self.persist(&next).await?;
        *rows = next;
        Ok(stored)
    }

    async fn update(&self, update: EventUpdate) -> Result<Option<CalendarEvent>> {
        let mut rows = self.rows.lock().await;
        let Some(index) = rows.iter().position(|e| e.id == update.id) else {
            return Ok(None);
        };

        let updated = update.apply_to(&rows[index]);
        let mut next = rows.clone();
        next[index] = updated.clone();
        self.persist(&next).await?;
        *rows = next;
        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> Result<DeleteOutcome> {
        let mut rows = self.rows.lock().await;
        let index = rows
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| ScheduleError::NotFound(id.to_string()))?;

        let mut next = rows.clone();
        next.remove(index);
        self.persist(&next).await?;
        *rows = next;
        Ok(DeleteOutcome::Completed)
    }

    fn name(&self) -> &str {
        "file"
    }

    async fn health(&self) -> Result<bool> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.exists()),
            _ => Ok(true),
        }
    }
}
