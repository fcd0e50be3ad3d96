//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use shopfix_core::CoreError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Core(core) => match core {
                CoreError::UnknownService(_) => (StatusCode::NOT_FOUND, "unknown_service"),
                CoreError::FileNotFound(_) => (StatusCode::NOT_FOUND, "file_not_found"),
                CoreError::InvalidParameter(_) | CoreError::Config(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "validation_error")
                }
                CoreError::ConnectionFailed { .. } | CoreError::DatabaseUnavailable { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_unavailable")
                }
                CoreError::CommandExecutionFailed { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "command_failed")
                }
                CoreError::ExecutionFailed { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "sql_failed")
                }
                CoreError::Io(_) | CoreError::Serialization(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
        };

        if status.is_server_error() {
            error!("Service call failed: {}", self);
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_service_is_not_found() {
        let error = ApiError::Core(CoreError::UnknownService("Nope".to_string()));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_parameter_status() {
        let error = ApiError::Core(CoreError::InvalidParameter("cl".to_string()));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_bad_request_status() {
        let error = ApiError::BadRequest("invalid input".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_command_failure_status() {
        let error = ApiError::Core(CoreError::CommandExecutionFailed {
            command: "mysql".to_string(),
            output: String::new(),
        });
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
