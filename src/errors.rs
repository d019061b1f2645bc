use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Top-level application error. All variants carry a human-readable message
/// for display/logging; `IntoResponse` maps each to a status-coded JSON body.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Auth / configuration ─────────────────────────────────────────────────
    #[error("Missing required environment variable: {name}")]
    MissingEnv { name: String },

    #[error("Agent API not configured: {detail}")]
    AgentNotConfigured { detail: String },

    #[error("Unauthorized")]
    Unauthorized,

    // ── Validation ───────────────────────────────────────────────────────────
    #[error("{message}")]
    InvalidInput { message: String },

    // ── Upstream agent errors ────────────────────────────────────────────────
    #[error("Agent returned status {status}: {detail}")]
    AgentRejected { status: u16, detail: String },

    #[error("Agent request failed: {detail}")]
    AgentRequestFailed { detail: String },

    #[error("Failed to read agent stream: {detail}")]
    StreamReadFailed { detail: String },

    /// The stream carried an explicit `conversation.chat.failed` or `error` event.
    #[error("{detail}")]
    UpstreamFailure { detail: String },

    #[error("No conversation id found in agent stream")]
    NoConversationId,

    #[error("No reply content found in agent stream")]
    NoReplyContent,

    // ── Database errors ──────────────────────────────────────────────────────
    #[error("Database connection failed")]
    DatabaseConnectionFailed(#[source] sqlx::Error),

    #[error("Database migration failed")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),

    #[error("Database query failed: {message}")]
    DatabaseQueryFailed {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    // ── System errors ────────────────────────────────────────────────────────
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn db_query(message: impl Into<String>, source: sqlx::Error) -> Self {
        AppError::DatabaseQueryFailed { message: message.into(), source }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        AppError::InvalidInput { message: message.into() }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            AppError::AgentNotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::AgentRejected { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short summary for the `error` field; anything longer goes in `detail`.
    fn summary(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "Unauthorized",
            AppError::InvalidInput { .. } => "Invalid request",
            AppError::AgentNotConfigured { .. } => "Agent API not configured",
            AppError::AgentRejected { .. } => "Agent service temporarily unavailable",
            AppError::AgentRequestFailed { .. }
            | AppError::StreamReadFailed { .. }
            | AppError::UpstreamFailure { .. }
            | AppError::NoConversationId
            | AppError::NoReplyContent => "Agent chat request failed",
            AppError::DatabaseConnectionFailed(_)
            | AppError::MigrationFailed(_)
            | AppError::DatabaseQueryFailed { .. } => "Database operation failed",
            AppError::MissingEnv { .. } | AppError::Unexpected(_) => "Unexpected error",
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            AppError::Unauthorized => None,
            AppError::InvalidInput { message } => Some(message.clone()),
            AppError::AgentRejected { status, detail } => Some(if *status == 401 {
                "Invalid agent API key".to_string()
            } else {
                detail.clone()
            }),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.summary(), detail: self.detail() };
        (self.status(), Json(body)).into_response()
    }
}
