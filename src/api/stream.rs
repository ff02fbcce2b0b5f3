use std::convert::Infallible;

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use futures::StreamExt;

use crate::server::state::AppState;
use crate::stream::NotificationStream;

/// GET /events/stream - Live change notifications as Server-Sent Events.
///
/// Frames go out exactly as [`SseFrame::encode`](crate::stream::SseFrame::encode)
/// writes them. The bus subscription lives inside the response body, so it
/// is released as soon as the client goes away and hyper drops the body.
pub async fn handler(State(state): State<AppState>) -> impl IntoResponse {
    let stream = NotificationStream::open(state.commands.bus(), &state.stream);
    let body = Body::from_stream(stream.map(|frame| Ok::<_, Infallible>(frame.encode())));

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache, no-transform"),
        ],
        body,
    )
}
