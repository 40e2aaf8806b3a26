//! API error handling.
//!
//! Every error leaves the API as `{"error": {"code", "message", "details"?}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::auth::{AccountError, PasswordError, PermissionError};
use crate::FoodsavingError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Unauthorized (401).
    Unauthorized,
    /// Forbidden (403).
    Forbidden,
    /// Not found (404).
    NotFound,
    /// Conflict (409).
    Conflict,
    /// Validation error (422) - for field-level validation errors.
    ValidationError,
    /// Too many requests (429).
    TooManyRequests,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Field-level validation error details (only present for validation errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with field-level details.
    pub fn with_details(
        code: ErrorCode,
        message: impl Into<String>,
        details: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Create a rate limit error.
    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TooManyRequests, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a validation error with field-level details.
    pub fn validation(details: HashMap<String, Vec<String>>) -> Self {
        Self::with_details(ErrorCode::ValidationError, "Validation failed", details)
    }

    /// Create a validation error from validator::ValidationErrors.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut details: HashMap<String, Vec<String>> = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
                .collect();
            details.insert(field.to_string(), messages);
        }

        Self::validation(details)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<FoodsavingError> for ApiError {
    fn from(err: FoodsavingError) -> Self {
        match &err {
            FoodsavingError::Auth(msg) => ApiError::unauthorized(msg.clone()),
            FoodsavingError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
            FoodsavingError::Validation(msg) => ApiError::bad_request(msg.clone()),
            FoodsavingError::Permission(msg) => ApiError::forbidden(msg.clone()),
            FoodsavingError::Conflict(msg) => ApiError::conflict(msg.clone()),
            _ => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(msg) => ApiError::bad_request(msg),
            AccountError::Password(e @ (PasswordError::TooShort | PasswordError::TooLong)) => {
                ApiError::bad_request(e.to_string())
            }
            AccountError::Password(e) => {
                tracing::error!("Password hashing error: {}", e);
                ApiError::internal("An internal error occurred")
            }
            AccountError::Permission(PermissionError::NotAuthenticated) => {
                ApiError::unauthorized("Authentication required")
            }
            AccountError::Permission(e) => ApiError::forbidden(e.to_string()),
            AccountError::Key(e) => ApiError::bad_request(e.to_string()),
            AccountError::InvalidCredentials => ApiError::unauthorized(err.to_string()),
            AccountError::EmailTaken => ApiError::conflict(err.to_string()),
            AccountError::MissingEmail | AccountError::AlreadyVerified => {
                ApiError::bad_request(err.to_string())
            }
            AccountError::NotFound => ApiError::not_found(err.to_string()),
            AccountError::Internal(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::KeyError;

    #[test]
    fn test_error_code_status() {
        assert_eq!(ErrorCode::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::ValidationError.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::TooManyRequests.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ErrorCode::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_constructors() {
        let err = ApiError::bad_request("bad");
        assert_eq!(err.code, ErrorCode::BadRequest);

        let err = ApiError::unauthorized("unauth");
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let err = ApiError::forbidden("forbid");
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = ApiError::not_found("missing");
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = ApiError::conflict("dup");
        assert_eq!(err.code, ErrorCode::Conflict);

        let err = ApiError::too_many_requests("slow down");
        assert_eq!(err.code, ErrorCode::TooManyRequests);

        let err = ApiError::internal("error");
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[test]
    fn test_validation_error() {
        let mut details = HashMap::new();
        details.insert("display_name".to_string(), vec!["Too short".to_string()]);
        details.insert(
            "email".to_string(),
            vec!["Invalid format".to_string(), "Required".to_string()],
        );

        let err = ApiError::validation(details);
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Validation failed");
        assert!(err.details.is_some());

        let details = err.details.unwrap();
        assert_eq!(
            details.get("display_name").unwrap(),
            &vec!["Too short".to_string()]
        );
        assert_eq!(
            details.get("email").unwrap(),
            &vec!["Invalid format".to_string(), "Required".to_string()]
        );
    }

    #[test]
    fn test_from_foodsaving_error() {
        let err: ApiError = FoodsavingError::Validation("bad".into()).into();
        assert_eq!(err.code, ErrorCode::BadRequest);

        let err: ApiError = FoodsavingError::NotFound("conversation".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "conversation not found");

        let err: ApiError = FoodsavingError::Conflict("dup".into()).into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ApiError = FoodsavingError::Database("disk on fire".into()).into();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.message, "An internal error occurred");
    }

    #[test]
    fn test_from_account_error() {
        let err: ApiError = AccountError::AlreadyVerified.into();
        assert_eq!(err.code, ErrorCode::BadRequest);
        assert_eq!(err.message, "Already verified");

        let err: ApiError = AccountError::Permission(PermissionError::AlreadyVerified).into();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err: ApiError = AccountError::Permission(PermissionError::NotAuthenticated).into();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let err: ApiError = AccountError::Key(KeyError::Expired).into();
        assert_eq!(err.code, ErrorCode::BadRequest);

        let err: ApiError = AccountError::Password(PasswordError::TooShort).into();
        assert_eq!(err.code, ErrorCode::BadRequest);

        let err: ApiError = AccountError::EmailTaken.into();
        assert_eq!(err.code, ErrorCode::Conflict);

        let err: ApiError = AccountError::InvalidCredentials.into();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }
}
