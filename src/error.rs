//! Error types for Toyrent server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Application error codes returned in error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchUser = 4,
    NoSuchToy = 5,
    NoSuchRental = 6,
    InsufficientStock = 7,
    Duplicate = 8,
    InvalidRentalState = 9,
    InvalidReturnDate = 10,
    UnknownRentalItem = 11,
    InvalidCondition = 12,
    BadValue = 18,
    NoSuchData = 20,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Persistence failure from the underlying store
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Toy {0} not found")]
    ToyNotFound(Uuid),

    #[error("Insufficient stock for toy {0}")]
    InsufficientStock(String),

    #[error("Rental {0} not found")]
    RentalNotFound(Uuid),

    #[error("Invalid rental state: {0}")]
    InvalidRentalState(String),

    #[error("Invalid return date: {0}")]
    InvalidReturnDate(String),

    #[error("Rental item {0} not found in rental")]
    UnknownRentalItem(Uuid),

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
            AppError::ToyNotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchToy, self.to_string())
            }
            AppError::RentalNotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchRental, self.to_string())
            }
            AppError::InsufficientStock(_) => {
                (StatusCode::CONFLICT, ErrorCode::InsufficientStock, self.to_string())
            }
            AppError::InvalidRentalState(_) => {
                (StatusCode::CONFLICT, ErrorCode::InvalidRentalState, self.to_string())
            }
            AppError::InvalidReturnDate(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidReturnDate, self.to_string())
            }
            AppError::UnknownRentalItem(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::UnknownRentalItem, self.to_string())
            }
            AppError::InvalidCondition(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidCondition, self.to_string())
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
