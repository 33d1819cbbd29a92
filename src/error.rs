//! Unified error handling for the Gigport backend
//!
//! One taxonomy for every business-rule failure, with HTTP status mapping
//! and machine-readable codes. Unexpected failures (database, internal)
//! collapse into generic 5xx responses that never leak internals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::error::DatabaseError;
use crate::payments::error::GatewayError;

pub type AppResult<T> = Result<T, AppError>;

/// Error codes for programmatic client handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    #[serde(rename = "NOT_FOUND")]
    NotFound,
    #[serde(rename = "FORBIDDEN")]
    Forbidden,
    #[serde(rename = "UNAUTHENTICATED")]
    Unauthenticated,
    #[serde(rename = "CONFLICT")]
    Conflict,
    #[serde(rename = "INVALID_ARGUMENT")]
    InvalidArgument,
    #[serde(rename = "GATEWAY_UNAVAILABLE")]
    GatewayUnavailable,
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

/// Unified application error type
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Entity absent
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Authenticated but not authorized for this entity or action
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Missing, invalid, or expired credentials
    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// State-machine precondition violated, or a concurrent writer won
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Malformed or out-of-range input
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Payment provider unreachable, timed out, or not configured
    #[error("Payment gateway unavailable: {message}")]
    GatewayUnavailable { message: String, configured: bool },

    /// Persistence failure
    #[error("Database error: {message}")]
    Database { message: String },

    /// Anything else unexpected
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn not_found(entity: &'static str) -> Self {
        AppError::NotFound { entity }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        AppError::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        AppError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound { .. } => 404,
            AppError::Forbidden { .. } => 403,
            AppError::Unauthenticated { .. } => 401,
            AppError::Conflict { .. } => 409,
            AppError::InvalidArgument { .. } => 400,
            AppError::GatewayUnavailable { configured, .. } => {
                if *configured {
                    502
                } else {
                    503
                }
            }
            AppError::Database { .. } | AppError::Internal { .. } => 500,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::Unauthenticated { .. } => ErrorCode::Unauthenticated,
            AppError::Conflict { .. } => ErrorCode::Conflict,
            AppError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            AppError::GatewayUnavailable { .. } => ErrorCode::GatewayUnavailable,
            AppError::Database { .. } | AppError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Get user-facing error message
    ///
    /// Server-side failures return a generic message; the detail stays in
    /// the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database { .. } | AppError::Internal { .. } => {
                "An internal server error occurred. Please try again later".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database {
            message: err.to_string(),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let configured = !matches!(err, GatewayError::NotConfigured);
        AppError::GatewayUnavailable {
            message: err.user_message(),
            configured,
        }
    }
}
