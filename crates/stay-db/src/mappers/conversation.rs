//! Conversation entity <-> model mapper
//!
//! A conversation is stored across three tables; the mapper stitches the
//! conversation row, its message ids and its unread rows back together.

use std::collections::HashMap;

use stay_core::entities::{Conversation, ParticipantPair};
use stay_core::error::DomainError;
use stay_core::value_objects::Snowflake;

use crate::models::{ConversationModel, MessageRefModel, UnreadModel};

/// Build conversations from their rows, message refs and unread rows.
/// Output order follows `models`.
pub fn assemble_conversations(
    models: Vec<ConversationModel>,
    message_refs: Vec<MessageRefModel>,
    unread: Vec<UnreadModel>,
) -> Result<Vec<Conversation>, DomainError> {
    let mut ids_by_conversation: HashMap<i64, Vec<Snowflake>> = HashMap::new();
    for r in message_refs {
        ids_by_conversation
            .entry(r.conversation_id)
            .or_default()
            .push(Snowflake::new(r.id));
    }

    let mut unread_by_conversation: HashMap<i64, HashMap<Snowflake, i32>> = HashMap::new();
    for u in unread {
        unread_by_conversation
            .entry(u.conversation_id)
            .or_default()
            .insert(Snowflake::new(u.user_id), u.count);
    }

    models
        .into_iter()
        .map(|model| {
            let participants = ParticipantPair::new(
                Snowflake::new(model.participant_low),
                Snowflake::new(model.participant_high),
            )
            .map_err(|_| {
                DomainError::DatabaseError(format!(
                    "conversation {} has identical participants",
                    model.id
                ))
            })?;

            Ok(Conversation {
                id: Snowflake::new(model.id),
                participants,
                message_ids: ids_by_conversation.remove(&model.id).unwrap_or_default(),
                unread: unread_by_conversation.remove(&model.id).unwrap_or_default(),
                created_at: model.created_at,
                updated_at: model.updated_at,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_assemble() {
        let now = Utc::now();
        let models = vec![
            ConversationModel {
                id: 10,
                participant_low: 1,
                participant_high: 2,
                created_at: now,
                updated_at: now,
            },
            ConversationModel {
                id: 11,
                participant_low: 1,
                participant_high: 3,
                created_at: now,
                updated_at: now,
            },
        ];
        let refs = vec![
            MessageRefModel { conversation_id: 10, id: 100 },
            MessageRefModel { conversation_id: 10, id: 101 },
        ];
        let unread = vec![UnreadModel {
            conversation_id: 10,
            user_id: 2,
            count: 2,
        }];

        let conversations = assemble_conversations(models, refs, unread).unwrap();
        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0].message_ids.len(), 2);
        assert_eq!(conversations[0].unread_for(Snowflake::new(2)), 2);
        assert!(conversations[1].message_ids.is_empty());
        assert_eq!(conversations[1].unread_for(Snowflake::new(3)), 0);
    }
}
