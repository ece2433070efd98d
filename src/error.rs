use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    /// The identity provider rejected the request. Carries the provider's
    /// `error.message` verbatim.
    #[error("{0}")]
    Auth(String),

    #[error("{provider} error: {message}")]
    Upstream {
        provider: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for an upstream failure with a known HTTP status.
    pub fn upstream(provider: &'static str, status: u16, message: impl Into<String>) -> Self {
        AppError::Upstream {
            provider,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Shorthand for an upstream reply that could not be interpreted.
    pub fn malformed(provider: &'static str, message: impl Into<String>) -> Self {
        AppError::Upstream {
            provider,
            status: None,
            message: message.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotAuthenticated | AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Network(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// Extractor rejections reply with the same JSON error body as handlers
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;
