//! In-memory store fake for exercising the chat service without a
//! database.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use clubhouse_database::{
    ChatMessage, ChatSpace, NewChatMessage, StorageError, StorageResult, User,
};

use crate::store::ChatStore;

/// In-memory [`ChatStore`] with the same access semantics as the real
/// storage adapter: public spaces open to all, private spaces gated on a
/// membership entry.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<i64, User>>>,
    spaces: Arc<RwLock<HashMap<i64, ChatSpace>>>,
    memberships: Arc<RwLock<Vec<(i64, i64)>>>,
    messages: Arc<RwLock<Vec<ChatMessage>>>,
    next_message_id: Arc<RwLock<i64>>,
    fail_writes: Arc<RwLock<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, id: i64, username: &str, display_name: Option<&str>) {
        self.users.write().await.insert(
            id,
            User {
                id,
                username: username.to_string(),
                display_name: display_name.map(str::to_string),
                avatar_url: None,
                activity_score: 0,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        );
    }

    pub async fn add_space(&self, id: i64, name: &str, is_private: bool) {
        self.spaces.write().await.insert(
            id,
            ChatSpace {
                id,
                name: name.to_string(),
                description: None,
                is_private,
                created_by_id: 0,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        );
    }

    pub async fn add_membership(&self, user_id: i64, chat_space_id: i64) {
        self.memberships.write().await.push((user_id, chat_space_id));
    }

    /// Drop a membership, as when a member is removed between their join
    /// and a later post.
    pub async fn remove_membership(&self, user_id: i64, chat_space_id: i64) {
        self.memberships
            .write()
            .await
            .retain(|entry| *entry != (user_id, chat_space_id));
    }

    /// Make subsequent message writes fail, to exercise persistence
    /// error handling.
    pub async fn fail_writes(&self, fail: bool) {
        *self.fail_writes.write().await = fail;
    }

    /// Snapshot of every message persisted so far
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }
}

impl ChatStore for MemoryStore {
    async fn get_user(&self, id: i64) -> StorageResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_chat_space_by_id(&self, id: i64) -> StorageResult<Option<ChatSpace>> {
        Ok(self.spaces.read().await.get(&id).cloned())
    }

    async fn has_access_to_chat_space(
        &self,
        user_id: i64,
        chat_space_id: i64,
    ) -> StorageResult<bool> {
        let Some(space) = self.spaces.read().await.get(&chat_space_id).cloned() else {
            return Ok(false);
        };

        if !space.is_private {
            return Ok(true);
        }

        Ok(self
            .memberships
            .read()
            .await
            .contains(&(user_id, chat_space_id)))
    }

    async fn create_chat_message(&self, message: &NewChatMessage) -> StorageResult<ChatMessage> {
        if *self.fail_writes.read().await {
            return Err(StorageError::Connection("injected write failure".to_string()));
        }

        let mut next_id = self.next_message_id.write().await;
        *next_id += 1;

        let saved = ChatMessage {
            id: *next_id,
            content: message.content.clone(),
            kind: message.kind,
            chat_space_id: message.chat_space_id,
            user_id: message.user_id,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.messages.write().await.push(saved.clone());
        Ok(saved)
    }
}
