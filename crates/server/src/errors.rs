use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// Client-facing failures. Bodies are plain text for compatibility with the web client.
#[derive(Debug)]
pub enum ApiError {
    InvalidResort,
    ResortExists,
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Model(_) => ApiError::InvalidResort,
            ServiceError::Conflict(_) => ApiError::ResortExists,
            ServiceError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidResort => (StatusCode::BAD_REQUEST, "Invalid resort data!").into_response(),
            ApiError::ResortExists => (StatusCode::BAD_REQUEST, "Resort already exists").into_response(),
            ApiError::Internal(msg) => {
                error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
}
