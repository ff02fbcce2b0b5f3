use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dirs;
use crate::error::{Result, ScheduleError};
use crate::store::{EventStore, FileEventStore, MemoryEventStore};
use crate::stream::StreamConfig;
use crate::validate::ValidationPolicy;

/// Environment variable that overrides `webhook_secret`
pub const WEBHOOK_SECRET_ENV: &str = "WEBHOOK_SECRET";

/// Which event store backend to use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Volatile in-process store
    Memory,

    /// JSON file holding one row per event
    File {
        #[serde(default = "dirs::events_path")]
        path: PathBuf,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            path: dirs::events_path(),
        }
    }
}

impl StoreConfig {
    /// Construct the configured backend
    pub fn open(&self) -> Result<Arc<dyn EventStore>> {
        match self {
            StoreConfig::Memory => Ok(Arc::new(MemoryEventStore::new())),
            StoreConfig::File { path } => Ok(Arc::new(FileEventStore::open(path.clone())?)),
        }
    }
}

/// User-configurable settings for the schedule server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Host address for the HTTP server (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the HTTP server (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret the change webhook must present; webhook calls are
    /// rejected while unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,

    /// Largest accepted range query span in days (0 = unlimited)
    #[serde(default = "default_max_range_days")]
    pub max_range_days: u32,

    /// Require update/delete ids to be UUID v4 strings
    #[serde(default)]
    pub require_uuid_ids: bool,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub stream: StreamConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_range_days() -> u32 {
    ValidationPolicy::default().max_range_days
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook_secret: None,
            max_range_days: default_max_range_days(),
            require_uuid_ids: false,
            store: StoreConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

impl ScheduleConfig {
    /// Load configuration from the default config file path, then apply
    /// environment overrides. Returns defaults if the file does not exist.
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&dirs::config_path())?;
        Ok(config.with_webhook_secret_override(std::env::var(WEBHOOK_SECRET_ENV).ok()))
    }

    /// Load configuration from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScheduleError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: ScheduleConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Replace the webhook secret when a non-empty override is given
    pub fn with_webhook_secret_override(mut self, secret: Option<String>) -> Self {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.webhook_secret = Some(secret);
        }
        self
    }

    /// Returns the server bind address string (e.g., "127.0.0.1:3000").
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            max_range_days: self.max_range_days,
            require_uuid_ids: self.require_uuid_ids,
        }
    }
}
