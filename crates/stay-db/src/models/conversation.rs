//! Conversation database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for conversations table
#[derive(Debug, Clone, FromRow)]
pub struct ConversationModel {
    pub id: i64,
    pub participant_low: i64,
    pub participant_high: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for conversation_unread table
#[derive(Debug, Clone, FromRow)]
pub struct UnreadModel {
    pub conversation_id: i64,
    pub user_id: i64,
    pub count: i32,
}

/// Message id projected per conversation
#[derive(Debug, Clone, FromRow)]
pub struct MessageRefModel {
    pub conversation_id: i64,
    pub id: i64,
}
