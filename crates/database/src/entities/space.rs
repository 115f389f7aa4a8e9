//! Chat space entity definitions

use serde::{Deserialize, Serialize};

/// A named channel that scopes message visibility. May be public or private;
/// private spaces require a membership row for access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSpace {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub created_by_id: i64,
    pub created_at: String,
}
