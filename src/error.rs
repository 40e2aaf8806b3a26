//! Error types for the foodsaving backend.

use thiserror::Error;

/// Common error type for the foodsaving backend.
#[derive(Error, Debug)]
pub enum FoodsavingError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Unique constraint or state conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Outgoing mail could not be delivered.
    #[error("mail error: {0}")]
    Mail(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for FoodsavingError {
    fn from(e: sqlx::Error) -> Self {
        FoodsavingError::Database(e.to_string())
    }
}

/// Result type alias for foodsaving operations.
pub type Result<T> = std::result::Result<T, FoodsavingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = FoodsavingError::Auth("invalid password".to_string());
        assert_eq!(err.to_string(), "authentication error: invalid password");
    }

    #[test]
    fn test_permission_error_display() {
        let err = FoodsavingError::Permission("not the same user".to_string());
        assert_eq!(err.to_string(), "permission denied: not the same user");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = FoodsavingError::NotFound("user".to_string());
        assert_eq!(err.to_string(), "user not found");
    }

    #[test]
    fn test_conflict_error_display() {
        let err = FoodsavingError::Conflict("email already registered".to_string());
        assert_eq!(err.to_string(), "conflict: email already registered");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FoodsavingError = io_err.into();
        assert!(matches!(err, FoodsavingError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }
}
