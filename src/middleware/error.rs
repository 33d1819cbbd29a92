//! Error response formatting
//!
//! Every failure leaving the API uses one envelope shape with the HTTP
//! status, a machine-readable code, and a human-readable message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};

/// Standardized error response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status code, mirrored into the body for clients that only see
    /// the payload
    pub status: u16,

    /// Machine-readable error code
    pub error: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// ISO 8601 timestamp of the error
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn from_app_error(error: &AppError) -> Self {
        Self {
            status: error.status_code(),
            error: error.error_code(),
            message: error.user_message(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(
                error = ?self,
                status = %status_code.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::warn!(
                error = ?self,
                status = %status_code.as_u16(),
                "Client error occurred"
            );
        }

        (status_code, Json(ErrorResponse::from_app_error(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_status_code_and_message() {
        let error = AppError::conflict("A dispute already exists for this order");
        let envelope = ErrorResponse::from_app_error(&error);

        assert_eq!(envelope.status, 409);
        assert_eq!(envelope.error, ErrorCode::Conflict);
        assert!(envelope.message.contains("dispute"));
    }

    #[test]
    fn internal_envelope_is_generic() {
        let error = AppError::Internal {
            message: "stack trace goes here".to_string(),
        };
        let envelope = ErrorResponse::from_app_error(&error);

        assert_eq!(envelope.status, 500);
        assert!(!envelope.message.contains("stack trace"));
    }
}
