//! Community data access consumed by the realtime chat layer.

use crate::entities::{ChatMessage, ChatSpace, NewChatMessage, User};
use crate::types::StorageResult;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Storage collaborator for the chat service.
///
/// The chat layer consumes exactly these four operations and owns none of
/// the underlying data; the rest of the community application (profiles,
/// events, shop) manages these tables elsewhere.
#[derive(Clone)]
pub struct CommunityStorage {
    pool: SqlitePool,
}

impl CommunityStorage {
    /// Create a new storage handle over an initialized pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Look up a user by id
    pub async fn get_user(&self, id: i64) -> StorageResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, display_name, avatar_url, activity_score, created_at
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(User {
                id: row.try_get("id")?,
                username: row.try_get("username")?,
                display_name: row.try_get("display_name")?,
                avatar_url: row.try_get("avatar_url")?,
                activity_score: row.try_get("activity_score")?,
                created_at: row.try_get("created_at")?,
            })
        })
        .transpose()
    }

    /// Look up a chat space by id
    pub async fn get_chat_space_by_id(&self, id: i64) -> StorageResult<Option<ChatSpace>> {
        let row = sqlx::query(
            "SELECT id, name, description, is_private, created_by_id, created_at
             FROM chat_spaces WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(ChatSpace {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                is_private: row.try_get("is_private")?,
                created_by_id: row.try_get("created_by_id")?,
                created_at: row.try_get("created_at")?,
            })
        })
        .transpose()
    }

    /// Whether the user may read and post in the given space.
    ///
    /// Public spaces are open to everyone; private spaces require a
    /// membership row. An unknown space yields false.
    pub async fn has_access_to_chat_space(
        &self,
        user_id: i64,
        chat_space_id: i64,
    ) -> StorageResult<bool> {
        let Some(space) = self.get_chat_space_by_id(chat_space_id).await? else {
            return Ok(false);
        };

        if !space.is_private {
            return Ok(true);
        }

        let membership = sqlx::query(
            "SELECT id FROM chat_space_memberships WHERE user_id = ? AND chat_space_id = ?",
        )
        .bind(user_id)
        .bind(chat_space_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership.is_some())
    }

    /// Insert a chat message, returning the stored row with its
    /// server-assigned id and timestamp.
    ///
    /// Posting also bumps the author's community activity score.
    pub async fn create_chat_message(
        &self,
        message: &NewChatMessage,
    ) -> StorageResult<ChatMessage> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO chat_messages (content, kind, chat_space_id, user_id, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&message.content)
        .bind(message.kind.as_str())
        .bind(message.chat_space_id)
        .bind(message.user_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let message_id = result.last_insert_rowid();

        sqlx::query("UPDATE users SET activity_score = activity_score + 1 WHERE id = ?")
            .bind(message.user_id)
            .execute(&self.pool)
            .await?;

        info!(
            message_id,
            chat_space_id = message.chat_space_id,
            user_id = message.user_id,
            "stored chat message"
        );

        Ok(ChatMessage {
            id: message_id,
            content: message.content.clone(),
            kind: message.kind,
            chat_space_id: message.chat_space_id,
            user_id: message.user_id,
            created_at: now,
        })
    }
}
