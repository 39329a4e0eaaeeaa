use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so the preview-server handlers can return
/// `Result<T, AppError>` directly.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Could not extract a profile handle from '{0}'")]
    InvalidIdentifier(String),

    #[error("Remote returned status {status} - the profile may be private or not exist")]
    FetchFailed { status: u16 },

    #[error("Could not find CSRF token in the authenticated session")]
    AuthTokenMissing,

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("Theme '{name}' not found. Available themes: {available}")]
    InvalidTheme { name: String, available: String },

    #[error("Invalid hex color: {0} (use format #RRGGBB)")]
    InvalidColor(String),

    #[error("No PDF converter available. Install wkhtmltopdf, chromium or weasyprint. Last error: {last_error}")]
    NoConverterAvailable { last_error: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::FileNotFound(_) | AppError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidIdentifier(_)
            | AppError::InvalidTheme { .. }
            | AppError::InvalidColor(_) => StatusCode::BAD_REQUEST,
            _ => {
                tracing::error!("Internal error: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}
