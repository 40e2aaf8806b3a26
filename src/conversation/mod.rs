//! Conversations between users.
//!
//! A conversation has a type (one on one or multichat), an optional topic,
//! a set of participants and an ordered list of messages. Only
//! participants can read or post.

mod repository;
mod service;
mod types;

pub use repository::ConversationRepository;
pub use service::{ConversationService, MAX_MESSAGE_LENGTH, MAX_TOPIC_LENGTH};
pub use types::{Conversation, ConversationMessage, ConversationType, NewConversation};
