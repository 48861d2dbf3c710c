//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::handlers::{RegistrationError, TransactionError};
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    // Service errors
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // 404 Not Found
            AppError::AccountNotFound(num) => {
                (StatusCode::NOT_FOUND, "account_not_found", Some(num.clone()))
            }

            AppError::Transaction(err) => match err {
                TransactionError::InvalidAmount(e) => {
                    (StatusCode::BAD_REQUEST, "invalid_amount", Some(e.to_string()))
                }
                TransactionError::InvalidAccount(msg) => {
                    (StatusCode::NOT_FOUND, "invalid_account", Some(msg.clone()))
                }
                TransactionError::InsufficientFunds {
                    required,
                    available,
                } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "insufficient_funds",
                    Some(format!("required {}, available {}", required, available)),
                ),
                TransactionError::Persistence(e) => {
                    tracing::error!("Persistence failure: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error", None)
                }
            },

            AppError::Registration(err) => match err {
                RegistrationError::InvalidForm(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_registration", Some(msg.clone()))
                }
                RegistrationError::AccountNumbersExhausted => {
                    tracing::error!("Registration failed: {}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "account_numbers_exhausted", None)
                }
                RegistrationError::Store(e) => {
                    tracing::error!("Registration store error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
                }
            },

            // 500 Internal Server Error
            AppError::Store(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.status_and_code();

        // Server-side failures keep their cause in the log only
        let error = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
