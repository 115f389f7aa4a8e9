//! Wire frames exchanged over the chat websocket.
//!
//! Frames are JSON objects tagged by `type`, decoded once at the socket
//! boundary into a closed sum type and matched exhaustively from there.

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, ChatResult};

/// Frames a client may send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Join a chat space, binding this connection to it.
    #[serde(rename_all = "camelCase")]
    Join {
        user_id: i64,
        username: String,
        chat_space_id: i64,
    },
    /// Post a message to the joined chat space.
    #[serde(rename_all = "camelCase")]
    Message {
        chat_space_id: i64,
        content: String,
        user_id: i64,
    },
}

impl ClientFrame {
    /// Decode one inbound frame. Malformed JSON, an unknown tag, and
    /// missing fields all surface as [`ChatError::InvalidPayload`].
    pub fn decode(text: &str) -> ChatResult<Self> {
        serde_json::from_str(text).map_err(|error| {
            tracing::debug!(%error, "failed to decode client frame");
            ChatError::InvalidPayload
        })
    }
}

/// Frames the server sends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    /// Join confirmation, sent to the joining connection only.
    #[serde(rename_all = "camelCase")]
    Joined { chat_space_id: i64, message: String },
    /// Server-generated join/leave notice, sent to the whole room.
    System { message: String, timestamp: String },
    /// An accepted user message, sent to the whole room.
    #[serde(rename_all = "camelCase")]
    Message {
        id: i64,
        content: String,
        user_id: i64,
        username: String,
        timestamp: String,
    },
    /// Validation or persistence failure, sent to the offender only.
    Error { message: String },
}
