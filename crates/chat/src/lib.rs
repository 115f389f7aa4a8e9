//! # Clubhouse Chat Crate
//!
//! The realtime room broadcast service: tracks which live socket belongs
//! to which user and chat space, validates joins and posts against
//! community storage, and fans accepted messages out to every connection
//! bound to the space.
//!
//! The service is transport-agnostic; the gateway crate owns the
//! websocket plumbing and feeds frames in through [`ChatService`].

pub mod error;
pub mod registry;
pub mod service;
pub mod store;
pub mod testing;
pub mod wire;

// Re-export main types for convenience
pub use error::{ChatError, ChatResult};
pub use registry::{Binding, ConnectionId, ConnectionRegistry, FrameSender};
pub use service::ChatService;
pub use store::ChatStore;
pub use wire::{ClientFrame, ServerFrame};
