use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::server::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: String,
    pub subscribers: usize,
}

/// GET /health - Store reachability and the number of live stream subscribers.
pub async fn handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.commands.store();
    let healthy = match store.health().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!(store = store.name(), error = %e, "Store health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        store: store.name().to_string(),
        subscribers: state.commands.bus().subscriber_count(),
    })
}
