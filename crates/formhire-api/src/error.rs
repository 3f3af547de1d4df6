use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Internal message behind a 500, carried as a response extension.
/// `middleware::expose_error_details` moves it into the body when the
/// config allows.
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub error: String,
    pub detail: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("This job is no longer accepting applications")]
    JobClosed,

    #[error("You have already applied for this position")]
    DuplicateApplication,

    #[error("File size must be less than 5MB")]
    PayloadTooLarge,

    #[error("{context}: {detail}")]
    Dependency { context: &'static str, detail: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::DuplicateApplication => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) | Self::JobClosed => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Dependency { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(format!("{:#}", e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, detail) = match self {
            ApiError::Dependency { context, detail } => {
                error!("{}: {}", context, detail);
                (context.to_string(), Some(detail))
            }
            ApiError::Internal(detail) => {
                error!("Internal error: {}", detail);
                ("Internal server error".to_string(), Some(detail))
            }
            other => (other.to_string(), None),
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(ErrorDetails {
                error: message,
                detail,
            });
        }
        response
    }
}
