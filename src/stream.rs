//! Live change stream for one client connection
//!
//! A [`NotificationStream`] turns bus notifications into Server-Sent-Events
//! frames: a `retry` directive first, then one `data:` frame per
//! notification, with a `: keepalive` comment whenever the connection has
//! been open for another keep-alive period so proxies do not reap it.
//!
//! The bus subscription and the keep-alive timer are owned by the stream.
//! Dropping the stream (client disconnect) or calling
//! [`NotificationStream::close`] (server cancel) releases both, exactly once.

use crate::bus::{NotificationBus, Subscription};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_stream::wrappers::{IntervalStream, ReceiverStream};

/// Comment text of keep-alive frames
pub const KEEPALIVE_COMMENT: &str = "keepalive";

/// Stream timing and buffering settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Reconnect delay advertised to the browser, in milliseconds
    #[serde(default = "default_retry_ms")]
    pub retry_ms: u64,

    /// Seconds between keep-alive comments
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,

    /// Notifications held for a slow client before further ones are dropped
    #[serde(default = "default_buffer")]
    pub buffer: usize,
}

fn default_retry_ms() -> u64 {
    5000
}

fn default_keepalive_secs() -> u64 {
    25
}

fn default_buffer() -> usize {
    16
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            retry_ms: default_retry_ms(),
            keepalive_secs: default_keepalive_secs(),
            buffer: default_buffer(),
        }
    }
}

impl StreamConfig {
    pub fn retry(&self) -> Duration {
        Duration::from_millis(self.retry_ms)
    }

    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs.max(1))
    }
}

/// One SSE frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// Client reconnect delay directive
    Retry(Duration),

    /// Serialized notification payload
    Data(String),

    /// Comment line with no semantic payload
    Comment(&'static str),
}

impl SseFrame {
    /// Wire text of this frame, including the terminating blank line
    ///
    /// This is the exact text written to the HTTP response body.
    pub fn encode(&self) -> String {
        match self {
            SseFrame::Retry(delay) => format!("retry: {}\n\n", delay.as_millis()),
            SseFrame::Data(json) => format!("data: {json}\n\n"),
            SseFrame::Comment(text) => format!(": {text}\n\n"),
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, SseFrame::Data(_))
    }
}

/// Extract the payloads of `data:` frames from raw SSE text
///
/// Comment and `retry` lines are ignored, as an `EventSource` client would.
pub fn parse_data_frames(text: &str) -> Vec<String> {
    text.split("\n\n")
        .filter_map(|block| {
            let data: Vec<&str> = block
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|value| value.strip_prefix(' ').unwrap_or(value))
                .collect();
            (!data.is_empty()).then(|| data.join("\n"))
        })
        .collect()
}

/// SSE frame stream bound to one bus subscription
pub struct NotificationStream {
    frames: BoxStream<'static, SseFrame>,
    subscription: Subscription,
}

impl NotificationStream {
    /// Subscribe to `bus` and start the keep-alive timer
    ///
    /// Must be called within a Tokio runtime.
    pub fn open(bus: &NotificationBus, config: &StreamConfig) -> Self {
        let (tx, rx) = mpsc::channel::<SseFrame>(config.buffer.max(1));

        let subscription = bus.subscribe(move |notification| {
            let json = match serde_json::to_string(notification) {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to serialize notification");
                    return;
                }
            };
            match tx.try_send(SseFrame::Data(json)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("Stream client is behind, dropping notification");
                }
                Err(TrySendError::Closed(_)) => {}
            }
        });

        let period = config.keepalive();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let keepalive = IntervalStream::new(ticker).map(|_| SseFrame::Comment(KEEPALIVE_COMMENT));

        let frames = stream::once(futures::future::ready(SseFrame::Retry(config.retry())))
            .chain(stream::select(ReceiverStream::new(rx), keepalive))
            .boxed();

        tracing::debug!(subscribers = bus.subscriber_count(), "Stream opened");

        Self {
            frames,
            subscription,
        }
    }

    /// Cancel from the server side; the stream ends on its next poll
    pub fn close(&self) {
        self.subscription.unsubscribe();
    }

    pub fn is_open(&self) -> bool {
        self.subscription.is_active()
    }
}

impl Stream for NotificationStream {
    type Item = SseFrame;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<SseFrame>> {
        if !self.subscription.is_active() {
            return Poll::Ready(None);
        }
        self.frames.poll_next_unpin(cx)
    }
}

impl Drop for NotificationStream {
    fn drop(&mut self) {
        tracing::debug!("Stream closed");
    }
}
