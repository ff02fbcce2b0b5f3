//! Error types for zoo-schedule

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur while serving calendar events
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Client input was malformed (missing field, bad date, unknown type, ...)
    #[error("{0}")]
    Validation(String),

    /// Well-formed id with no matching record
    #[error("Event not found: {0}")]
    NotFound(String),

    /// Webhook secret missing or mismatched
    #[error("unauthorized")]
    Unauthorized,

    /// Event store call failed, timed out, or returned malformed data
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server bind/serve failure
    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl ScheduleError {
    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ScheduleError::Validation(_) => StatusCode::BAD_REQUEST,
            ScheduleError::NotFound(_) => StatusCode::NOT_FOUND,
            ScheduleError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to API clients.
    ///
    /// Internal failures collapse to a generic message; the detail is only logged.
    pub fn public_message(&self) -> String {
        match self {
            ScheduleError::Validation(msg) => msg.clone(),
            ScheduleError::NotFound(_) => "not found".to_string(),
            ScheduleError::Unauthorized => "unauthorized".to_string(),
            ScheduleError::Store(_) => "store error".to_string(),
            _ => "internal error".to_string(),
        }
    }
}

/// Result type alias for schedule operations
pub type Result<T> = std::result::Result<T, ScheduleError>;

impl IntoResponse for ScheduleError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = serde_json::json!({ "error": self.public_message() });
        (status, axum::Json(body)).into_response()
    }
}
