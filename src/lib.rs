//! # zoo-schedule
//!
//! Calendar event scheduling with live change notifications.
//!
//! ## Overview
//!
//! Clients create, update and delete dated events through a small set of
//! command endpoints and keep a Server-Sent-Events stream open to learn
//! when anything changed. Every committed mutation is announced on an
//! in-process [`NotificationBus`]; each open stream forwards it to its
//! browser, which then refetches the visible range.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use zoo_schedule::{EventCommands, InsertRequest, MemoryEventStore, NotificationBus};
//!
//! # async fn example() -> zoo_schedule::Result<()> {
//! let bus = NotificationBus::new();
//! let _sub = bus.subscribe(|n| println!("changed: {:?}", n.op));
//!
//! let commands = EventCommands::new(
//!     Arc::new(MemoryEventStore::new()),
//!     bus,
//!     Default::default(),
//! );
//!
//! let event = commands
//!     .insert(&InsertRequest {
//!         title: Some("Fütterung".into()),
//!         date: Some("2025-06-01".into()),
//!         event_type: Some("Veranstaltung".into()),
//!         description: None,
//!     })
//!     .await?;
//!
//! println!("Created: {}", event.id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **NotificationBus**: process-wide publish/subscribe with panic isolation
//! - **NotificationStream**: per-connection SSE adapter with retry and keep-alive
//! - **EventCommands**: validation, a single store call, publish on success
//! - **EventStore** trait: storage boundary (memory and JSON file backends)

pub mod api;
pub mod bus;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dirs;
pub mod error;
pub mod server;
pub mod store;
pub mod stream;
pub mod types;
pub mod validate;

// Re-export core types
pub use bus::{NotificationBus, Subscription};
pub use commands::EventCommands;
pub use config::{ScheduleConfig, StoreConfig};
pub use error::{Result, ScheduleError};
pub use store::{was_deleted, DeleteOutcome, EventStore, FileEventStore, MemoryEventStore};
pub use stream::{NotificationStream, SseFrame, StreamConfig};
pub use types::{
    CalendarEvent, ChangeNotification, ChangeOp, DeleteRequest, EventType, EventUpdate,
    InsertRequest, NewEvent, NotificationKind, RangeQuery, UpdateRequest,
};
pub use validate::ValidationPolicy;
