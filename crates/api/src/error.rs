use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use djumblelog_core::error::CoreError;
use djumblelog_core::template::TemplateError;
use djumblelog_db::JournalError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `djumblelog_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A template lookup or rendering failure.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A resource (page, feed) that cannot be addressed.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JournalError> for AppError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::Core(e) => AppError::Core(e),
            JournalError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::UnknownContentType(identifier) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Unknown content type: {identifier}"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Template(err) => internal("Template error", &err.to_string()),
                CoreError::Configuration(msg) => internal("Configuration error", msg),
                CoreError::Internal(msg) => internal("Internal core error", msg),
            },

            // --- Template errors ---
            AppError::Template(err) => internal("Template error", &err.to_string()),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InternalError(msg) => internal("Internal error", msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Log the real cause and return a sanitized 500.
fn internal(context: &str, detail: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "{context}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => internal("Database error", &other.to_string()),
    }
}
