//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::analysis::AnalysisError;
use crate::auth::{PasswordError, SessionError};
use crate::domain::{DomainError, MeasurementError};
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Version conflict: concurrent modification detected")]
    VersionConflict,

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Upstream service error: {0}")]
    UpstreamService(String),

    #[error("Storage error: {0}")]
    Storage(StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(username) => DomainError::DuplicateAccount(username).into(),
            StoreError::ConcurrencyConflict { .. } => AppError::VersionConflict,
            other => AppError::Storage(other),
        }
    }
}

impl From<MeasurementError> for AppError {
    fn from(err: MeasurementError) -> Self {
        AppError::Domain(err.into())
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Store(e) => e.into(),
            other @ SessionError::ExpiryOutOfRange => AppError::Internal(other.to_string()),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::UpstreamService(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // 401 Unauthorized
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", Some(msg.clone()))
            }

            // 409 Conflict
            AppError::VersionConflict => {
                (StatusCode::CONFLICT, "version_conflict", None)
            }

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(domain_err) => match domain_err {
                DomainError::DuplicateAccount(username) => {
                    (StatusCode::CONFLICT, "duplicate_account", Some(username.clone()))
                }
                DomainError::InvalidCredential => {
                    (StatusCode::UNAUTHORIZED, "invalid_credentials", None)
                }
                DomainError::AccountNotFound(username) => {
                    (StatusCode::NOT_FOUND, "account_not_found", Some(username.clone()))
                }
                DomainError::InvalidPeriodFormat(period) => {
                    (StatusCode::BAD_REQUEST, "invalid_period_format", Some(period.clone()))
                }
                DomainError::NoFieldsProvided => {
                    (StatusCode::BAD_REQUEST, "no_fields_provided", None)
                }
                DomainError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_input", Some(msg.clone()))
                }
            },

            // 502 Bad Gateway
            AppError::UpstreamService(msg) => {
                tracing::warn!("Upstream service error: {}", msg);
                (StatusCode::BAD_GATEWAY, "upstream_service_error", Some(msg.clone()))
            }

            // 500 Internal Server Error
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
