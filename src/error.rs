//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ItemId, TradeId, TradeStatus, UserId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "user not found: 7"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                          |
/// |-----------|-----------------|--------------------------------------|
/// | 1000–1999 | Client input    | 400 Bad Request / 401 Unauthorized   |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict         |
/// | 3000–3999 | Server          | 500 Internal Server Error            |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A unique field (email, username) is already taken.
    #[error("{0}")]
    Conflict(String),

    /// Login identifier or password did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User with the given ID was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// Item with the given ID was not found.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// Trade with the given ID was not found.
    #[error("trade not found: {0}")]
    TradeNotFound(TradeId),

    /// Requested status change is not allowed from the current status.
    #[error("cannot move trade from {from} to {to}")]
    InvalidTransition {
        /// Status the trade is currently in.
        from: TradeStatus,
        /// Status that was requested.
        to: TradeStatus,
    },

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// Schema migration failure at startup.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Conflict(_) => 1002,
            Self::InvalidCredentials => 1003,
            Self::UserNotFound(_) => 2001,
            Self::ItemNotFound(_) => 2002,
            Self::TradeNotFound(_) => 2003,
            Self::InvalidTransition { .. } => 2004,
            Self::Internal(_) => 3000,
            Self::Persistence(_) | Self::Migration(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UserNotFound(_) | Self::ItemNotFound(_) | Self::TradeNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::Persistence(_) | Self::Migration(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the message sent to the client.
    ///
    /// Server-side failures get a fixed message; their detail only goes to
    /// the log.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Persistence(_) => "database error".to_string(),
            Self::Migration(_) => "database schema error".to_string(),
            Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.public_message(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
