pub mod router;
pub mod state;

use crate::bus::NotificationBus;
use crate::config::ScheduleConfig;
use crate::error::{Result, ScheduleError};

/// Start the HTTP server with the given configuration.
pub async fn start(config: ScheduleConfig) -> Result<()> {
    let app_state = state::AppState::from_config(&config, NotificationBus::global().clone())?;
    tracing::info!(
        store = app_state.commands.store().name(),
        webhook = config.webhook_secret.is_some(),
        max_range_days = app_state.commands.policy().max_range_days,
        "Initialized event store"
    );

    let bind_addr = config.bind_address();
    let app = router::build(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| ScheduleError::Server(format!("Failed to bind to {bind_addr}: {e}")))?;

    tracing::info!("Server listening on {bind_addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ScheduleError::Server(format!("Server error: {e}")))?;

    Ok(())
}
