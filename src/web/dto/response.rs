//! Response DTOs for Web API.

use serde::Serialize;

use crate::conversation::{Conversation, ConversationMessage, ConversationType};
use crate::db::User;

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// List response wrapper.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    /// Response data.
    pub data: Vec<T>,
    /// List metadata.
    pub meta: ListMeta,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        let total = data.len() as u64;
        Self {
            data,
            meta: ListMeta { total },
        }
    }
}

/// List metadata.
#[derive(Debug, Serialize)]
pub struct ListMeta {
    /// Total number of items.
    pub total: u64,
}

// ============================================================================
// Auth DTOs
// ============================================================================

/// Login response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Access token (JWT).
    pub access_token: String,
    /// Always "Bearer".
    pub token_type: &'static str,
    /// Access token expiry in seconds.
    pub expires_in: u64,
    /// The logged in user.
    pub user: UserResponse,
}

// ============================================================================
// User DTOs
// ============================================================================

/// Serialized user.
///
/// `email` and `mail_verified` are only present when the viewer is the
/// user themself.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_verified: Option<bool>,
}

impl UserResponse {
    /// Serialize `user` as seen by `viewer_id`.
    pub fn for_viewer(user: &User, viewer_id: i64) -> Self {
        let is_self = user.id == viewer_id;
        Self {
            id: user.id,
            display_name: user.display_name.clone(),
            email: if is_self { user.email.clone() } else { None },
            description: user.description.clone(),
            mail_verified: is_self.then_some(user.mail_verified),
        }
    }

    /// Serialize `user` for themself.
    pub fn own(user: &User) -> Self {
        Self::for_viewer(user, user.id)
    }
}

// ============================================================================
// Conversation DTOs
// ============================================================================

/// Conversation response.
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub conversation_type: ConversationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub participants: Vec<i64>,
    pub created_at: String,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id,
            conversation_type: conversation.conversation_type,
            topic: conversation.topic,
            participants: conversation.participants,
            created_at: conversation.created_at,
        }
    }
}

/// Conversation message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    /// Conversation the message belongs to.
    pub in_conversation: i64,
    /// Author user ID.
    pub author: i64,
    pub content: String,
    pub created_at: String,
}

impl From<ConversationMessage> for MessageResponse {
    fn from(message: ConversationMessage) -> Self {
        Self {
            id: message.id,
            in_conversation: message.conversation_id,
            author: message.author_id,
            content: message.content,
            created_at: message.created_at,
        }
    }
}
