//! Chat message entity definitions

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub content: String,
    pub kind: MessageKind,
    pub chat_space_id: i64,
    pub user_id: i64,
    pub created_at: String,
}

/// Payload for inserting a new chat message; id and timestamp are assigned
/// by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChatMessage {
    pub content: String,
    pub kind: MessageKind,
    pub chat_space_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    System,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::System => "system",
        }
    }
}

impl From<&str> for MessageKind {
    fn from(s: &str) -> Self {
        match s {
            "system" => MessageKind::System,
            _ => MessageKind::Text,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
