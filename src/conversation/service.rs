//! Conversation service.
//!
//! Wraps the repository with participant checks and input validation.
//! A conversation a caller does not take part in is reported as not found.

use std::collections::BTreeSet;

use tracing::debug;

use super::repository::ConversationRepository;
use super::types::{Conversation, ConversationMessage, ConversationType, NewConversation};
use crate::db::{Database, User, UserRepository};
use crate::{FoodsavingError, Result};

/// Maximum topic length (in characters).
pub const MAX_TOPIC_LENGTH: usize = 255;

/// Maximum message length (in characters).
pub const MAX_MESSAGE_LENGTH: usize = 10_000;

fn validate_topic(topic: Option<String>) -> Result<Option<String>> {
    let Some(topic) = topic else {
        return Ok(None);
    };
    let topic = topic.trim();
    if topic.is_empty() {
        return Ok(None);
    }
    if topic.chars().count() > MAX_TOPIC_LENGTH {
        return Err(FoodsavingError::Validation(format!(
            "Topic must be at most {MAX_TOPIC_LENGTH} characters"
        )));
    }
    Ok(Some(topic.to_string()))
}

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(FoodsavingError::Validation(
            "Message must not be empty".to_string(),
        ));
    }
    if content.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(FoodsavingError::Validation(format!(
            "Message must be at most {MAX_MESSAGE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Service for conversation operations.
pub struct ConversationService<'a> {
    db: &'a Database,
}

impl<'a> ConversationService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn repo(&self) -> ConversationRepository<'a> {
        ConversationRepository::new(self.db.pool())
    }

    /// Start a conversation. The creator is always a participant.
    pub async fn create(
        &self,
        creator: &User,
        conversation_type: ConversationType,
        topic: Option<String>,
        participants: &[i64],
    ) -> Result<Conversation> {
        let topic = validate_topic(topic)?;

        let mut ids: BTreeSet<i64> = participants.iter().copied().collect();
        ids.insert(creator.id);

        let users = UserRepository::new(self.db.pool());
        for &id in &ids {
            let active = users
                .get_by_id(id)
                .await?
                .is_some_and(|u| u.is_active && !u.deleted);
            if !active {
                return Err(FoodsavingError::Validation(format!(
                    "User {id} does not exist"
                )));
            }
        }

        if conversation_type == ConversationType::OneOnOne && ids.len() != 2 {
            return Err(FoodsavingError::Validation(
                "A one on one conversation needs exactly two participants".to_string(),
            ));
        }

        let conversation = self
            .repo()
            .create(&NewConversation {
                conversation_type,
                topic,
                participants: ids.into_iter().collect(),
            })
            .await?;
        debug!(
            conversation_id = conversation.id,
            creator = creator.id,
            "Created conversation"
        );
        Ok(conversation)
    }

    /// Conversations the user takes part in.
    pub async fn list_for_user(&self, user: &User) -> Result<Vec<Conversation>> {
        self.repo().list_for_user(user.id).await
    }

    /// Get a conversation the user takes part in.
    pub async fn get_for_participant(&self, user: &User, id: i64) -> Result<Conversation> {
        self.repo()
            .get_by_id(id)
            .await?
            .filter(|c| c.has_participant(user.id))
            .ok_or_else(|| FoodsavingError::NotFound("conversation".to_string()))
    }

    /// Post a message as `author`.
    pub async fn add_message(
        &self,
        author: &User,
        conversation_id: i64,
        content: &str,
    ) -> Result<ConversationMessage> {
        self.ensure_participant(author, conversation_id).await?;
        validate_content(content)?;
        self.repo()
            .add_message(conversation_id, author.id, content)
            .await
    }

    /// Messages of a conversation the user takes part in.
    pub async fn list_messages(
        &self,
        user: &User,
        conversation_id: i64,
    ) -> Result<Vec<ConversationMessage>> {
        self.ensure_participant(user, conversation_id).await?;
        self.repo().list_messages(conversation_id).await
    }

    async fn ensure_participant(&self, user: &User, conversation_id: i64) -> Result<()> {
        if self.repo().is_participant(conversation_id, user.id).await? {
            Ok(())
        } else {
            Err(FoodsavingError::NotFound("conversation".to_string()))
        }
    }
}
