//! Entity definitions consumed by the chat layer

pub mod message;
pub mod space;
pub mod user;

pub use message::{ChatMessage, MessageKind, NewChatMessage};
pub use space::ChatSpace;
pub use user::User;
