use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only chat log row. Never updated after insert; deletable in bulk
/// per user. History is always read in timestamp ascending order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub user_id: Uuid,
    pub sender: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
