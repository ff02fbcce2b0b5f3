use std::sync::Arc;

use crate::bus::NotificationBus;
use crate::commands::EventCommands;
use crate::config::ScheduleConfig;
use crate::error::Result;
use crate::store::EventStore;
use crate::stream::StreamConfig;

/// Shared application state accessible to all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub commands: EventCommands,
    pub stream: StreamConfig,
    pub webhook_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        commands: EventCommands,
        stream: StreamConfig,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            commands,
            stream,
            webhook_secret: webhook_secret.map(Arc::from),
        }
    }

    /// Wire state from configuration around an already-open store.
    pub fn with_store(
        config: &ScheduleConfig,
        store: Arc<dyn EventStore>,
        bus: NotificationBus,
    ) -> Self {
        let commands = EventCommands::new(store, bus, config.validation_policy());
        Self::new(commands, config.stream, config.webhook_secret.clone())
    }

    /// Open the configured store and wire state around it.
    pub fn from_config(config: &ScheduleConfig, bus: NotificationBus) -> Result<Self> {
        let store = config.store.open()?;
        Ok(Self::with_store(config, store, bus))
    }
}
