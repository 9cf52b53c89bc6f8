//! Custom error types for the users service

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Realm announced to clients that fail HTTP Basic authentication
pub const AUTH_REALM: &str = "Basic realm=\"users\"";

/// Domain error raised by the record store, the photo store and the service
#[derive(Error, Debug)]
pub enum UserError {
    /// No user row with this id
    #[error("User {0} not found")]
    UserNotFound(i64),

    /// The user exists but has no photo, or its file is gone
    #[error("Photo for user {0} not found")]
    PhotoNotFound(i64),

    /// Duplicate email/phone or a missing required field
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Photo storage failure
    #[error("Photo storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Type alias for domain results
pub type UserResult<T> = Result<T, UserError>;

/// Error type for the HTTP boundary
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or wrong credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Referenced user or photo does not exist
    #[error("Not found: {0}")]
    NotFound(&'static str),

    /// The store rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed or oversized multipart upload
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::UserNotFound(_) => ApiError::NotFound("User not found"),
            UserError::PhotoNotFound(_) => ApiError::NotFound("Photo not found"),
            UserError::ConstraintViolation(msg) => ApiError::Conflict(msg),
            UserError::Io(e) => {
                error!("Photo storage failure: {}", e);
                ApiError::InternalServerError
            }
            UserError::Database(e) => ApiError::Database(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized => {
                let body = Json(json!({ "error": "Unauthorized" }));
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, AUTH_REALM)],
                    body,
                )
                    .into_response();
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Multipart(e) => (e.status(), e.body_text()),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Database(e) => {
                error!("Database failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
