//! Unified error handling for the call-masking service
//!
//! Every failure reaches the caller as `400 {"error": message}`. Callers of
//! the masking endpoint do not distinguish client errors from missing rows or
//! infrastructure failures, so neither does the response mapping. The
//! `code` field is carried alongside for log correlation.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Business Logic Errors ====================
    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("No active virtual number for booking: {0}")]
    VirtualNumberNotFound(String),

    #[error("Payment must be completed before enabling calls")]
    PaymentRequired,

    #[error("Virtual number has expired")]
    VirtualNumberExpired,

    /// Carries the rejected action for logs; the message stays fixed
    #[error("Invalid action")]
    InvalidAction(String),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::BookingNotFound(_) => "booking_not_found",
            AppError::VirtualNumberNotFound(_) => "virtual_number_not_found",
            AppError::PaymentRequired => "payment_required",
            AppError::VirtualNumberExpired => "virtual_number_expired",
            AppError::InvalidAction(_) => "invalid_action",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingField(_) => "missing_field",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": self.to_string(),
            "code": self.error_code(),
        });

        HttpResponse::build(self.status_code()).json(body)
    }
}

// ==================== From implementations ====================

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_is_bad_request() {
        assert_eq!(
            AppError::PaymentRequired.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Database("connection reset".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::BookingNotFound("b-1".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AppError::PaymentRequired.to_string(),
            "Payment must be completed before enabling calls"
        );
        assert_eq!(
            AppError::VirtualNumberExpired.to_string(),
            "Virtual number has expired"
        );
        assert_eq!(
            AppError::InvalidAction("dial".to_string()).to_string(),
            "Invalid action"
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::PaymentRequired.error_code(), "payment_required");
        assert_eq!(
            AppError::VirtualNumberExpired.error_code(),
            "virtual_number_expired"
        );
    }
}
