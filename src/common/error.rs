// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::{error, warn};

use crate::auth::AuthError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    ValidationError(String),
    InternalServer(String),
    BadGateway(String),
    ServiceUnavailable(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::BadGateway(msg) => write!(f, "Bad Gateway: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServer(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Whether the same request may succeed later without the client changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::BadGateway(_) | ApiError::ServiceUnavailable(_)
        )
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::ValidationError(msg)
            | ApiError::InternalServer(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InternalServer(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "UPSTREAM_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub retryable: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "Request failed");
        }

        let error_response = ErrorResponse {
            error: self.message().to_string(),
            code: self.code().to_string(),
            retryable: self.is_retryable(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Domain errors surface with a status that reflects who can fix them.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => ApiError::ValidationError(msg),
            AuthError::DuplicateKey => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::AccountNotFound => ApiError::NotFound(err.to_string()),
            AuthError::NotFound => ApiError::NotFound(err.to_string()),
            AuthError::InvalidToken(_) | AuthError::Unauthenticated => {
                ApiError::Unauthorized("Invalid session".to_string())
            }
            AuthError::OAuth(msg) => {
                error!(error = %msg, "OAuth provider failure");
                ApiError::BadGateway("Google sign-in failed, please try again".to_string())
            }
            AuthError::OAuthRejected(msg) => {
                warn!(error = %msg, "OAuth provider rejected the request");
                ApiError::BadRequest("Google sign-in was rejected, please start again".to_string())
            }
            AuthError::UnverifiedEmail => ApiError::Forbidden(err.to_string()),
            AuthError::Database(msg) => {
                error!(error = %msg, "Database failure");
                ApiError::ServiceUnavailable("Database operation failed".to_string())
            }
            AuthError::Internal(msg) => {
                error!(error = %msg, "Internal failure");
                ApiError::InternalServer("Internal server error".to_string())
            }
        }
    }
}
