// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Each variant maps to an HTTP status code and a
/// `{ success: false, error, code, timestamp }` body
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden access")]
    Forbidden,

    #[error("Internal server error")]
    InternalError,

    #[error("Payment gateway error: {0}")]
    ExternalApiError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Payload too large: limit is {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Insufficient wallet balance")]
    InsufficientBalance,

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::AlreadyExists(_) => "ALREADY_EXISTS",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::InternalError => "INTERNAL_ERROR",
            ApiError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            ApiError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ApiError::InvalidState(_) => "INVALID_STATE",
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        log::error!("Database error: {}", e);
        ApiError::DatabaseError(e.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(e.to_string())
    }
}

/// Convert ApiError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        // Database details stay in the logs
        let message = match self {
            ApiError::DatabaseError(_) => "Database error".to_string(),
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "error": message,
            "code": self.code(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyExists(_) => StatusCode::CONFLICT,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            ApiError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InsufficientBalance => StatusCode::CONFLICT,
            ApiError::InvalidState(_) => StatusCode::CONFLICT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn test_error_body_shape() {
        let resp = ApiError::NotFound("Campaign".into()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let bytes = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Campaign not found");
        assert_eq!(body["code"], "NOT_FOUND");
        assert!(body["timestamp"].is_string());
    }

    #[actix_rt::test]
    async fn test_database_error_is_not_leaked() {
        let resp = ApiError::DatabaseError("relation \"users\" does not exist".into())
            .error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Database error");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::InsufficientBalance.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::PayloadTooLarge(10).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::RateLimitExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
