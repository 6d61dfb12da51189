//! In-memory implementation of ConversationRepository

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use stay_core::entities::{Conversation, Message, ParticipantPair};
use stay_core::error::DomainError;
use stay_core::traits::{ConversationRepository, RepoResult};
use stay_core::value_objects::Snowflake;

#[derive(Default)]
struct State {
    conversations: HashMap<Snowflake, Conversation>,
    by_pair: HashMap<ParticipantPair, Snowflake>,
    messages: HashMap<Snowflake, Vec<Message>>,
}

impl State {
    fn get_or_create(&mut self, pair: ParticipantPair, new_id: Snowflake) -> &mut Conversation {
        let id = *self.by_pair.entry(pair).or_insert(new_id);
        self.conversations
            .entry(id)
            .or_insert_with(|| Conversation::new(id, pair))
    }
}

#[derive(Default)]
pub struct InMemoryConversationRepository {
    state: Mutex<State>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        Ok(self.state.lock().conversations.get(&id).cloned())
    }

    async fn find_by_pair(&self, pair: &ParticipantPair) -> RepoResult<Option<Conversation>> {
        let state = self.state.lock();
        Ok(state
            .by_pair
            .get(pair)
            .and_then(|id| state.conversations.get(id))
            .cloned())
    }

    async fn get_or_create(
        &self,
        pair: &ParticipantPair,
        new_id: Snowflake,
    ) -> RepoResult<Conversation> {
        Ok(self.state.lock().get_or_create(*pair, new_id).clone())
    }

    async fn find_by_participant(&self, user_id: Snowflake) -> RepoResult<Vec<Conversation>> {
        let mut found: Vec<Conversation> = self
            .state
            .lock()
            .conversations
            .values()
            .filter(|c| c.participants.includes(user_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn append_message(
        &self,
        message: &Message,
        new_conversation_id: Snowflake,
    ) -> RepoResult<(Message, Conversation)> {
        let pair = ParticipantPair::new(message.sender_id, message.receiver_id)?;
        let mut state = self.state.lock();

        let conversation = state.get_or_create(pair, new_conversation_id);
        let mut stored = message.clone();
        stored.conversation_id = conversation.id;
        conversation.record_message(stored.id, stored.receiver_id, stored.created_at)?;
        let conversation = conversation.clone();

        state
            .messages
            .entry(conversation.id)
            .or_default()
            .push(stored.clone());

        Ok((stored, conversation))
    }

    async fn read_thread(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Vec<Message>> {
        let mut state = self.state.lock();
        state
            .conversations
            .get_mut(&conversation_id)
            .ok_or(DomainError::ConversationNotFound(conversation_id))?
            .mark_read(user_id);
        Ok(state
            .messages
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn messages(&self, conversation_id: Snowflake) -> RepoResult<Vec<Message>> {
        Ok(self
            .state
            .lock()
            .messages
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }
}
