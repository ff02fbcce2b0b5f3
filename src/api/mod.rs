//! HTTP surface: event commands, change webhook, live stream, health
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/events/range?from=&to=` | Events in a date range |
//! | `POST` | `/events/insert` | Create an event |
//! | `POST` | `/events/update` | Replace an event's fields |
//! | `POST` | `/events/delete` | Delete an event |
//! | `POST` | `/events/webhook` | Signal an external change |
//! | `GET` | `/events/stream` | Server-Sent-Events change stream |
//! | `GET` | `/health` | Store and subscriber status |

pub mod events;
pub mod health;
pub mod stream;
pub mod webhook;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;

use crate::server::state::AppState;

/// `Cache-Control` value for every non-stream response
pub const NO_STORE: &str = "no-store, no-cache, must-revalidate";

/// Build the API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/range", get(events::range).options(preflight))
        .route("/events/insert", post(events::insert).options(preflight))
        .route("/events/update", post(events::update).options(preflight))
        .route("/events/delete", post(events::delete).options(preflight))
        .route("/events/webhook", post(webhook::handler).options(preflight))
        .route("/events/stream", get(stream::handler).options(preflight))
        .route("/health", get(health::handler))
}

/// OPTIONS - Cross-origin probe; nothing to report.
pub async fn preflight() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
