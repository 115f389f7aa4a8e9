//! Clubhouse Storage Crate
//!
//! Storage collaborator for the Clubhouse chat backend: connection
//! management, migrations, the entities the chat layer consumes, and the
//! [`CommunityStorage`] adapter exposing the four operations the realtime
//! service depends on.

use sqlx::SqlitePool;

use clubhouse_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod storage;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;
pub use storage::CommunityStorage;

// Re-export entities
pub use entities::{ChatMessage, ChatSpace, MessageKind, NewChatMessage, User};

// Re-export types
pub use types::{StorageError, StorageResult};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> StorageResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| StorageError::Migration(e.to_string()))?;

    Ok(pool)
}
