//! Storage interface consumed by the chat service.

use clubhouse_database::{
    ChatMessage, ChatSpace, CommunityStorage, NewChatMessage, StorageResult, User,
};

/// The slice of community storage the realtime chat layer depends on.
///
/// Fronting the concrete store with a trait keeps the service testable
/// against in-memory fakes; the service is injected with an
/// implementation at construction time.
pub trait ChatStore {
    async fn get_user(&self, id: i64) -> StorageResult<Option<User>>;
    async fn get_chat_space_by_id(&self, id: i64) -> StorageResult<Option<ChatSpace>>;
    async fn has_access_to_chat_space(
        &self,
        user_id: i64,
        chat_space_id: i64,
    ) -> StorageResult<bool>;
    async fn create_chat_message(&self, message: &NewChatMessage) -> StorageResult<ChatMessage>;
}

impl ChatStore for CommunityStorage {
    async fn get_user(&self, id: i64) -> StorageResult<Option<User>> {
        self.get_user(id).await
    }

    async fn get_chat_space_by_id(&self, id: i64) -> StorageResult<Option<ChatSpace>> {
        self.get_chat_space_by_id(id).await
    }

    async fn has_access_to_chat_space(
        &self,
        user_id: i64,
        chat_space_id: i64,
    ) -> StorageResult<bool> {
        self.has_access_to_chat_space(user_id, chat_space_id).await
    }

    async fn create_chat_message(&self, message: &NewChatMessage) -> StorageResult<ChatMessage> {
        self.create_chat_message(message).await
    }
}
