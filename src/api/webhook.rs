use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::error::{Result, ScheduleError};
use crate::server::state::AppState;

/// Header carrying the shared webhook secret
pub const SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Debug, Default, Deserialize)]
pub struct WebhookQuery {
    secret: Option<String>,
}

/// Secret presented by the caller: the header wins, the query string is the fallback
fn provided_secret<'a>(headers: &'a HeaderMap, query: &'a WebhookQuery) -> &'a str {
    headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .or(query.secret.as_deref())
        .unwrap_or_default()
}

fn secret_matches(expected: Option<&str>, provided: &str) -> bool {
    match expected {
        Some(expected) if !expected.is_empty() => {
            expected.as_bytes().ct_eq(provided.as_bytes()).into()
        }
        _ => false,
    }
}

/// POST /events/webhook - An external editor changed the store; tell live clients.
pub async fn handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Option<Query<WebhookQuery>>,
) -> Result<Json<serde_json::Value>> {
    let query = query.map(|Query(q)| q).unwrap_or_default();

    if !secret_matches(state.webhook_secret.as_deref(), provided_secret(&headers, &query)) {
        tracing::warn!("Webhook rejected: secret mismatch");
        return Err(ScheduleError::Unauthorized);
    }

    state.commands.signal_external_change();
    Ok(Json(serde_json::json!({ "ok": true })))
}
