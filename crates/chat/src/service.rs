//! The room broadcast service.
//!
//! One registry of live connections; join and message dispatch validate
//! against community storage, then fan accepted frames out to every
//! connection currently bound to the space.

use chrono::Utc;
use tracing::{debug, warn};

use clubhouse_database::{MessageKind, NewChatMessage};

use crate::error::{ChatError, ChatResult};
use crate::registry::{ConnectionId, ConnectionRegistry, FrameSender};
use crate::store::ChatStore;
use crate::wire::{ClientFrame, ServerFrame};

const NO_ACCESS: &str = "You do not have access to this chat space";
const NOT_JOINED: &str = "You have not joined this chat space";

/// Realtime chat service over an injected storage collaborator.
///
/// The service owns the connection registry for its lifetime; handlers
/// never assume the registry is unchanged across an await on storage and
/// re-read it when fanning out.
pub struct ChatService<S> {
    store: S,
    registry: ConnectionRegistry,
}

impl<S: ChatStore> ChatService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            registry: ConnectionRegistry::new(),
        }
    }

    /// Register a newly accepted socket. Frames addressed to it are
    /// pushed into `sender`.
    pub async fn connect(&self, sender: FrameSender) -> ConnectionId {
        self.registry.register(sender).await
    }

    /// Dispatch one inbound frame.
    ///
    /// Validation and persistence failures are reported to the sending
    /// connection only; nothing here ever fails the connection or the
    /// process.
    pub async fn handle_frame(&self, connection_id: ConnectionId, text: &str) {
        let result = match ClientFrame::decode(text) {
            Ok(ClientFrame::Join {
                user_id,
                username,
                chat_space_id,
            }) => {
                self.handle_join(connection_id, user_id, &username, chat_space_id)
                    .await
            }
            Ok(ClientFrame::Message {
                chat_space_id,
                content,
                user_id,
            }) => {
                self.handle_message(connection_id, user_id, chat_space_id, content)
                    .await
            }
            Err(error) => Err(error),
        };

        if let Err(error) = result {
            debug!(connection_id, %error, "rejected client frame");
            self.send_to(
                connection_id,
                &ServerFrame::Error {
                    message: error.to_string(),
                },
            )
            .await;
        }
    }

    /// Remove the connection and announce its departure to the space it
    /// had joined, if any. Safe to call for never-joined or already
    /// removed connections.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let Some(binding) = self.registry.unregister(connection_id).await else {
            return;
        };

        if let (Some(chat_space_id), Some(username)) = (binding.chat_space_id, binding.username) {
            debug!(connection_id, chat_space_id, "connection left chat space");
            self.broadcast(
                chat_space_id,
                &ServerFrame::System {
                    message: format!("{username} left the chat"),
                    timestamp: Utc::now().to_rfc3339(),
                },
            )
            .await;
        }
    }

    async fn handle_join(
        &self,
        connection_id: ConnectionId,
        user_id: i64,
        username: &str,
        chat_space_id: i64,
    ) -> ChatResult<()> {
        let space = self
            .store
            .get_chat_space_by_id(chat_space_id)
            .await?
            .ok_or(ChatError::SpaceNotFound)?;

        if space.is_private
            && !self
                .store
                .has_access_to_chat_space(user_id, chat_space_id)
                .await?
        {
            return Err(ChatError::access_denied(NO_ACCESS));
        }

        self.registry
            .bind(connection_id, user_id, username, chat_space_id)
            .await;

        debug!(connection_id, user_id, chat_space_id, "connection joined chat space");

        self.send_to(
            connection_id,
            &ServerFrame::Joined {
                chat_space_id,
                message: format!("Joined {}", space.name),
            },
        )
        .await;

        self.broadcast(
            chat_space_id,
            &ServerFrame::System {
                message: format!("{username} joined the chat"),
                timestamp: Utc::now().to_rfc3339(),
            },
        )
        .await;

        Ok(())
    }

    async fn handle_message(
        &self,
        connection_id: ConnectionId,
        user_id: i64,
        chat_space_id: i64,
        content: String,
    ) -> ChatResult<()> {
        // A connection only posts into the space it joined; a payload
        // addressed elsewhere is rejected before any storage work.
        match self.registry.bound_space(connection_id).await {
            Some(bound) if bound == chat_space_id => {}
            _ => return Err(ChatError::access_denied(NOT_JOINED)),
        }

        let user = self.store.get_user(user_id).await?;
        let space = self.store.get_chat_space_by_id(chat_space_id).await?;
        let (Some(user), Some(space)) = (user, space) else {
            return Err(ChatError::UnknownUserOrSpace);
        };

        // Membership may have changed since the join, so check again.
        if space.is_private
            && !self
                .store
                .has_access_to_chat_space(user_id, chat_space_id)
                .await?
        {
            return Err(ChatError::access_denied(NO_ACCESS));
        }

        let saved = self
            .store
            .create_chat_message(&NewChatMessage {
                content,
                kind: MessageKind::Text,
                chat_space_id,
                user_id,
            })
            .await
            .map_err(|error| {
                warn!(connection_id, chat_space_id, %error, "failed to persist chat message");
                ChatError::Persistence(error)
            })?;

        // Room membership is re-read here, after the persistence await:
        // joins and disconnects processed meanwhile are honoured.
        self.broadcast(
            chat_space_id,
            &ServerFrame::Message {
                id: saved.id,
                content: saved.content,
                user_id: saved.user_id,
                username: user.visible_name().to_string(),
                timestamp: saved.created_at,
            },
        )
        .await;

        Ok(())
    }

    /// Serialize `frame` once and push it to every open connection bound
    /// to the space. Closed connections are skipped; their own disconnect
    /// path cleans them up. Best-effort, no delivery guarantee.
    pub async fn broadcast(&self, chat_space_id: i64, frame: &ServerFrame) {
        let payload = match serde_json::to_string(frame) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, "failed to serialize broadcast frame");
                return;
            }
        };

        for sender in self.registry.senders_for_space(chat_space_id).await {
            let _ = sender.send(payload.clone());
        }
    }

    async fn send_to(&self, connection_id: ConnectionId, frame: &ServerFrame) {
        let Some(sender) = self.registry.sender(connection_id).await else {
            return;
        };

        match serde_json::to_string(frame) {
            Ok(payload) => {
                let _ = sender.send(payload);
            }
            Err(error) => warn!(%error, "failed to serialize frame"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use serde_json::Value;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    async fn connect(service: &ChatService<MemoryStore>) -> (ConnectionId, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = service.connect(tx).await;
        (id, rx)
    }

    fn next_frame(rx: &mut UnboundedReceiver<String>) -> Value {
        let payload = rx.try_recv().expect("expected a frame");
        serde_json::from_str(&payload).unwrap()
    }

    #[tokio::test]
    async fn join_unknown_space_reports_error_to_sender_only() {
        let store = MemoryStore::new();
        let service = ChatService::new(store);
        let (id, mut rx) = connect(&service).await;

        service
            .handle_frame(id, r#"{"type":"join","userId":7,"username":"Alice","chatSpaceId":9}"#)
            .await;

        let frame = next_frame(&mut rx);
        assert_eq!(frame["type"], "error");
        assert_eq!(frame["message"], "Chat space not found");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn message_before_join_is_rejected() {
        let store = MemoryStore::new();
        store.add_user(7, "alice", Some("Alice")).await;
        store.add_space(1, "General", false).await;
        let service = ChatService::new(store.clone());
        let (id, mut rx) = connect(&service).await;

        service
            .handle_frame(id, r#"{"type":"message","chatSpaceId":1,"content":"hi","userId":7}"#)
            .await;

        let frame = next_frame(&mut rx);
        assert_eq!(frame["type"], "error");
        assert_eq!(frame["message"], "You have not joined this chat space");
        assert!(store.messages().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_frame_leaves_connection_usable() {
        let store = MemoryStore::new();
        store.add_space(1, "General", false).await;
        let service = ChatService::new(store);
        let (id, mut rx) = connect(&service).await;

        service.handle_frame(id, "{not json").await;
        let frame = next_frame(&mut rx);
        assert_eq!(frame["message"], "Invalid message format");

        service
            .handle_frame(id, r#"{"type":"join","userId":7,"username":"Alice","chatSpaceId":1}"#)
            .await;
        let frame = next_frame(&mut rx);
        assert_eq!(frame["type"], "joined");
    }

    #[tokio::test]
    async fn persistence_failure_is_reported_and_not_broadcast() {
        let store = MemoryStore::new();
        store.add_user(7, "alice", Some("Alice")).await;
        store.add_space(1, "General", false).await;
        let service = ChatService::new(store.clone());

        let (id, mut rx) = connect(&service).await;
        service
            .handle_frame(id, r#"{"type":"join","userId":7,"username":"Alice","chatSpaceId":1}"#)
            .await;
        // joined + system notice
        next_frame(&mut rx);
        next_frame(&mut rx);

        store.fail_writes(true).await;
        service
            .handle_frame(id, r#"{"type":"message","chatSpaceId":1,"content":"hi","userId":7}"#)
            .await;

        let frame = next_frame(&mut rx);
        assert_eq!(frame["type"], "error");
        assert_eq!(frame["message"], "Failed to save message");
        assert!(rx.try_recv().is_err());

        // The connection survives the failure
        store.fail_writes(false).await;
        service
            .handle_frame(id, r#"{"type":"message","chatSpaceId":1,"content":"hi","userId":7}"#)
            .await;
        let frame = next_frame(&mut rx);
        assert_eq!(frame["type"], "message");
        assert_eq!(frame["content"], "hi");
    }
}
