//! Shared application state for the gateway

use std::sync::Arc;

use sqlx::SqlitePool;

use clubhouse_chat::ChatService;
use clubhouse_database::CommunityStorage;

/// Shared state handed to every gateway handler.
///
/// Owns the realtime chat service for the lifetime of the server; the
/// service in turn owns the connection registry.
#[derive(Clone)]
pub struct GatewayState {
    /// Database connection pool
    pub pool: SqlitePool,
    /// Realtime chat service over community storage
    pub chat: Arc<ChatService<CommunityStorage>>,
}

impl GatewayState {
    /// Create gateway state over an initialized database pool
    pub fn new(pool: SqlitePool) -> Self {
        let storage = CommunityStorage::new(pool.clone());
        Self {
            pool,
            chat: Arc::new(ChatService::new(storage)),
        }
    }
}
