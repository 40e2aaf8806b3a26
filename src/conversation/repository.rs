//! Conversation repository.

use super::types::{Conversation, ConversationMessage, ConversationType, NewConversation};
use crate::db::DbPool;
use crate::{FoodsavingError, Result};

/// Repository for conversations, participants and messages.
pub struct ConversationRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ConversationRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a conversation and its participant rows in one transaction.
    pub async fn create(&self, new_conversation: &NewConversation) -> Result<Conversation> {
        let mut tx = self.pool.begin().await?;

        let id: i64 =
            sqlx::query_scalar("INSERT INTO conversations (type, topic) VALUES (?, ?) RETURNING id")
                .bind(new_conversation.conversation_type.as_i64())
                .bind(&new_conversation.topic)
                .fetch_one(&mut *tx)
                .await?;

        for &user_id in &new_conversation.participants {
            sqlx::query(
                "INSERT OR IGNORE INTO conversation_participants (conversation_id, user_id)
                 VALUES (?, ?)",
            )
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| FoodsavingError::NotFound("conversation".to_string()))
    }

    /// Get a conversation by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Conversation>> {
        let row: Option<ConversationRow> = sqlx::query_as(
            "SELECT id, type AS conversation_type, topic, created_at
             FROM conversations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let participants = self.participants(row.id).await?;
                Ok(Some(row.into_conversation(participants)?))
            }
            None => Ok(None),
        }
    }

    /// List the conversations `user_id` takes part in, oldest first.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Conversation>> {
        let rows: Vec<ConversationRow> = sqlx::query_as(
            "SELECT c.id, c.type AS conversation_type, c.topic, c.created_at
             FROM conversations c
             JOIN conversation_participants p ON p.conversation_id = c.id
             WHERE p.user_id = ?
             ORDER BY c.id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in rows {
            let participants = self.participants(row.id).await?;
            conversations.push(row.into_conversation(participants)?);
        }
        Ok(conversations)
    }

    /// Participant user ids of a conversation, ascending.
    pub async fn participants(&self, conversation_id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT user_id FROM conversation_participants
             WHERE conversation_id = ? ORDER BY user_id",
        )
        .bind(conversation_id)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn is_participant(&self, conversation_id: i64, user_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM conversation_participants
                WHERE conversation_id = ? AND user_id = ?
            )",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Store a message.
    pub async fn add_message(
        &self,
        conversation_id: i64,
        author_id: i64,
        content: &str,
    ) -> Result<ConversationMessage> {
        let message = sqlx::query_as::<_, ConversationMessage>(
            "INSERT INTO conversation_messages (conversation_id, author_id, content)
             VALUES (?, ?, ?)
             RETURNING id, conversation_id, author_id, content, created_at",
        )
        .bind(conversation_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(self.pool)
        .await?;
        Ok(message)
    }

    /// Messages of a conversation in posting order.
    pub async fn list_messages(&self, conversation_id: i64) -> Result<Vec<ConversationMessage>> {
        let messages = sqlx::query_as::<_, ConversationMessage>(
            "SELECT id, conversation_id, author_id, content, created_at
             FROM conversation_messages
             WHERE conversation_id = ?
             ORDER BY id",
        )
        .bind(conversation_id)
        .fetch_all(self.pool)
        .await?;
        Ok(messages)
    }
}

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: i64,
    conversation_type: i64,
    topic: Option<String>,
    created_at: String,
}

impl ConversationRow {
    fn into_conversation(self, participants: Vec<i64>) -> Result<Conversation> {
        let conversation_type = ConversationType::from_i64(self.conversation_type).ok_or_else(|| {
            FoodsavingError::Database(format!(
                "invalid conversation type {} for conversation {}",
                self.conversation_type, self.id
            ))
        })?;

        Ok(Conversation {
            id: self.id,
            conversation_type,
            topic: self.topic,
            participants,
            created_at: self.created_at,
        })
    }
}
