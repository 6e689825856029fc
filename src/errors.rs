use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::validate::FieldErrors;

/// Failures surfaced by the backend client. Handlers and the flow services
/// match on these instead of sniffing message strings.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend rejected the stored identity. Always rendered with the
    /// one canonical message, whatever the backend's own wording was.
    #[error("Please log in to continue")]
    Unauthorized,

    /// Envelope-level rejection (`success: false` or an error body with a
    /// message), carried verbatim.
    #[error("{message}")]
    Backend {
        message: String,
        suggestion: Option<String>,
    },

    /// Non-2xx response without a usable body message.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse server response")]
    Decode,
}

impl ApiError {
    pub fn backend(message: impl Into<String>) -> Self {
        ApiError::Backend {
            message: message.into(),
            suggestion: None,
        }
    }

    /// Message text as the user sees it.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Error surface of this service's own routes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(FieldErrors),

    /// No session token, or one this service does not know.
    #[error("unauthorized")]
    Unauthorized,

    /// Valid session here, but the backend no longer accepts its identity.
    #[error("Please log in to continue")]
    SessionExpired,

    #[error("{0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Guard rejections and lost races; the client should re-read state.
    #[error("{0}")]
    Conflict(String),

    /// The backend turned down a well-formed login or registration;
    /// message carried verbatim for the user.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Backend(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => AppError::SessionExpired,
            other => AppError::Backend(other.message()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized | AppError::SessionExpired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Rejected(_) => StatusCode::BAD_REQUEST,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::Validation(fields) => serde_json::json!({
                "error": self.to_string(),
                "fields": fields,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
