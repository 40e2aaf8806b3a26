//! Conversation model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationType {
    /// Private conversation between exactly two users.
    #[default]
    OneOnOne,
    /// Conversation with any number of participants.
    Multichat,
}

impl ConversationType {
    /// Integer stored in the `type` column.
    pub fn as_i64(&self) -> i64 {
        match self {
            ConversationType::OneOnOne => 0,
            ConversationType::Multichat => 1,
        }
    }

    /// Parse the stored integer representation.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(ConversationType::OneOnOne),
            1 => Some(ConversationType::Multichat),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationType::OneOnOne => "one_on_one",
            ConversationType::Multichat => "multichat",
        }
    }
}

impl fmt::Display for ConversationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConversationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "one_on_one" => Ok(ConversationType::OneOnOne),
            "multichat" => Ok(ConversationType::Multichat),
            _ => Err(format!("unknown conversation type: {s}")),
        }
    }
}

/// Conversation entity with its participant ids.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: i64,
    pub conversation_type: ConversationType,
    pub topic: Option<String>,
    /// Participant user ids, ascending.
    pub participants: Vec<i64>,
    pub created_at: String,
}

impl Conversation {
    pub fn has_participant(&self, user_id: i64) -> bool {
        self.participants.contains(&user_id)
    }
}

/// Data for creating a conversation.
#[derive(Debug, Clone, Default)]
pub struct NewConversation {
    pub conversation_type: ConversationType,
    pub topic: Option<String>,
    pub participants: Vec<i64>,
}

/// A message posted to a conversation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConversationMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: String,
}
