//! Message entity <-> model mapper

use stay_core::entities::Message;
use stay_core::error::DomainError;
use stay_core::value_objects::Snowflake;

use crate::models::MessageModel;

/// Convert MessageModel to Message entity
impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        Ok(Message {
            id: Snowflake::new(model.id),
            conversation_id: Snowflake::new(model.conversation_id),
            sender_id: Snowflake::new(model.sender_id),
            receiver_id: Snowflake::new(model.receiver_id),
            kind: model.kind.parse()?,
            content: model.content,
            created_at: model.created_at,
        })
    }
}

/// Message values for database insertion
pub struct MessageInsert<'a> {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: &'a str,
    pub kind: &'static str,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message, conversation_id: Snowflake) -> Self {
        Self {
            id: message.id.into_inner(),
            conversation_id: conversation_id.into_inner(),
            sender_id: message.sender_id.into_inner(),
            receiver_id: message.receiver_id.into_inner(),
            content: &message.content,
            kind: message.kind.as_str(),
        }
    }
}
