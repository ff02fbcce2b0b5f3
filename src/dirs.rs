use std::path::PathBuf;

/// Returns the base directory for Zoo Schedule data.
///
/// Uses `$ZOO_SCHEDULE_HOME` if set, otherwise defaults to `~/.zoo-schedule`.
pub fn schedule_home() -> PathBuf {
    if let Ok(home) = std::env::var("ZOO_SCHEDULE_HOME") {
        return PathBuf::from(home);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".zoo-schedule")
}

/// Returns the path to the user configuration file.
pub fn config_path() -> PathBuf {
    schedule_home().join("config.toml")
}

/// Returns the default location of the file-backed event store.
pub fn events_path() -> PathBuf {
    schedule_home().join("events.json")
}
