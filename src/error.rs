use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::constants::ERR_INVALID_CREDENTIALS;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::error::EncodeError),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bincode::error::DecodeError),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing or invalid session")]
    Unauthorized,

    #[error("Admin role required")]
    Forbidden,

    #[error("Email already registered")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Task not found")]
    TaskNotFound,

    #[error("Task is not active")]
    TaskInactive,

    #[error("Task not started")]
    TaskNotStarted,

    #[error("Verification timer still running")]
    VerificationPending,

    #[error("Task already completed")]
    TaskAlreadyCompleted,

    #[error("Withdrawal not found")]
    WithdrawalNotFound,

    #[error("Withdrawal already resolved")]
    WithdrawalAlreadyResolved,

    #[error("Amount below minimum")]
    AmountBelowMinimum,

    #[error("Insufficient point balance")]
    InsufficientBalance,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Transaction(ref e) => {
                tracing::error!("Transaction error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Table(ref e) => {
                tracing::error!("Table error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Storage(ref e) => {
                tracing::error!("Storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Commit(ref e) => {
                tracing::error!("Commit error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Serialization(ref e) => {
                tracing::error!("Serialization error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            // Malformed stored records fail closed with a 500 instead of
            // being silently reset to defaults.
            AppError::Deserialization(ref e) => {
                tracing::error!("Deserialization error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::TaskJoin(ref e) => {
                tracing::error!("Task join error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, ERR_INVALID_CREDENTIALS),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Admin role required"),
            AppError::EmailTaken => (StatusCode::CONFLICT, "Email already registered"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            AppError::TaskNotFound => (StatusCode::NOT_FOUND, "Task not found"),
            AppError::TaskInactive => (StatusCode::CONFLICT, "Task is not active"),
            AppError::TaskNotStarted => (
                StatusCode::CONFLICT,
                "Task has not been started - open it first",
            ),
            AppError::VerificationPending => (
                StatusCode::CONFLICT,
                "Verification timer has not finished yet",
            ),
            AppError::TaskAlreadyCompleted => {
                (StatusCode::CONFLICT, "Task has already been completed")
            }
            AppError::WithdrawalNotFound => (StatusCode::NOT_FOUND, "Withdrawal not found"),
            AppError::WithdrawalAlreadyResolved => (
                StatusCode::CONFLICT,
                "Withdrawal has already been resolved",
            ),
            AppError::AmountBelowMinimum => (
                StatusCode::BAD_REQUEST,
                "Amount is below the minimum withdrawal of Rs. 1000",
            ),
            AppError::InsufficientBalance => (
                StatusCode::BAD_REQUEST,
                "Insufficient points for this amount",
            ),
            AppError::InvalidInput(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
