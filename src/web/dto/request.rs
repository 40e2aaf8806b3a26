//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};
use crate::conversation::ConversationType;

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,
    #[validate(
        length(min = 1, max = 80, message = "Display name must be 1 to 80 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub display_name: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Partial user update request.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 80, message = "Display name must be 1 to 80 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub display_name: Option<String>,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Mail verification request.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct VerifyMailRequest {
    #[serde(default)]
    pub key: String,
}

/// Password reset request. A missing email is reported as 400 by the handler.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// User list query.
#[derive(Debug, Default, Deserialize)]
pub struct UserSearchQuery {
    /// Case-insensitive substring of the display name.
    pub search: Option<String>,
}

/// Conversation creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateConversationRequest {
    #[serde(rename = "type", default)]
    pub conversation_type: ConversationType,
    #[serde(default)]
    #[validate(length(max = 255, message = "Topic must be at most 255 characters"))]
    pub topic: Option<String>,
    /// Other participants; the caller is added automatically.
    #[serde(default)]
    pub participants: Vec<i64>,
}

/// New message request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMessageRequest {
    #[validate(
        length(min = 1, max = 10000, message = "Message must be 1 to 10000 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub content: String,
}
