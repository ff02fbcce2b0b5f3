use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;

use crate::error::{Result, ScheduleError};
use crate::server::state::AppState;
use crate::types::{CalendarEvent, DeleteRequest, InsertRequest, RangeQuery, UpdateRequest};

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        ScheduleError::Validation("invalid JSON body".to_string())
    })
}

/// GET /events/range - Events between `from` and `to`, ascending by date.
pub async fn range(
    State(state): State<AppState>,
    query: std::result::Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<Vec<CalendarEvent>>> {
    let Query(query) = query.map_err(|_| ScheduleError::Validation("from/to required".to_string()))?;
    let events = state.commands.range(&query).await?;
    Ok(Json(events))
}

/// POST /events/insert - Create an event.
pub async fn insert(
    State(state): State<AppState>,
    payload: std::result::Result<Json<InsertRequest>, JsonRejection>,
) -> Result<Json<CalendarEvent>> {
    let request = body(payload)?;
    let created = state.commands.insert(&request).await?;
    Ok(Json(created))
}

/// POST /events/update - Replace an existing event's fields.
pub async fn update(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<CalendarEvent>> {
    let request = body(payload)?;
    let updated = state.commands.update(&request).await?;
    Ok(Json(updated))
}

/// POST /events/delete - Delete an event by id.
pub async fn delete(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let request = body(payload)?;
    state.commands.delete(&request).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
