// Error handling module for the storefront API
// Converts domain errors into HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::orders::error::{ErrorKind, OrderError};

/// Main error type for the API
/// All handlers return Result<T, ApiError>
#[derive(Debug)]
pub enum ApiError {
    /// Request DTO failed `validator` checks
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Domain errors, mapped by their stable kind
    Order(OrderError),

    /// Missing or invalid bearer token
    /// Maps to HTTP 401 Unauthorized
    Unauthorized(String),

    /// Maps to HTTP 500, details stay in the logs
    InternalError(String),
}

/// Consistent error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. "QUOTA_EXCEEDED")
    pub error_code: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(error_code: &str, message: String, details: Option<serde_json::Value>) -> Self {
        Self {
            error_code: error_code.to_string(),
            message,
            details,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

/// HTTP status for a domain error kind
pub fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::QuotaExceeded | ErrorKind::OwnershipMismatch => StatusCode::FORBIDDEN,
        ErrorKind::StoreNotFound | ErrorKind::ProductNotFound | ErrorKind::OrderNotFound => {
            StatusCode::NOT_FOUND
        }
        ErrorKind::InsufficientStock | ErrorKind::ValidationFailure => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Database => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        "VALIDATION_ERROR",
                        "Request validation failed".to_string(),
                        Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({}))),
                    ),
                )
            }
            ApiError::Order(err) => {
                let kind = err.kind();
                let status = status_for_kind(kind);

                if status.is_server_error() {
                    error!("Order operation failed: {}", err);
                    return (
                        status,
                        ErrorResponse::new(
                            kind.as_str(),
                            "A database error occurred".to_string(),
                            None,
                        ),
                    );
                }

                if status == StatusCode::FORBIDDEN {
                    warn!("Forbidden: {}", err);
                } else {
                    debug!("Order request rejected: {}", err);
                }
                (
                    status,
                    ErrorResponse::new(kind.as_str(), err.to_string(), err.details()),
                )
            }
            ApiError::Unauthorized(message) => {
                warn!("Unauthorized access attempt: {}", message);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new("UNAUTHORIZED", message.clone(), None),
                )
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "INTERNAL_ERROR",
                        "An internal server error occurred".to_string(),
                        None,
                    ),
                )
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Order(err) => status_for_kind(err.kind()),
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(error: OrderError) -> Self {
        ApiError::Order(error)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::Order(OrderError::from(error))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}
