//! PostgreSQL implementation of ConversationRepository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use stay_core::entities::{Conversation, Message, ParticipantPair};
use stay_core::error::DomainError;
use stay_core::traits::{ConversationRepository, RepoResult};
use stay_core::value_objects::Snowflake;

use crate::mappers::{assemble_conversations, MessageInsert};
use crate::models::{ConversationModel, MessageModel, MessageRefModel, UnreadModel};

use super::error::map_db_error;

/// PostgreSQL implementation of ConversationRepository
#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    /// Create a new PgConversationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load message ids and unread counters for the given conversation rows
    async fn hydrate(&self, models: Vec<ConversationModel>) -> RepoResult<Vec<Conversation>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();

        let message_refs = sqlx::query_as::<_, MessageRefModel>(
            r"
            SELECT conversation_id, id
            FROM messages
            WHERE conversation_id = ANY($1)
            ORDER BY created_at, id
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let unread = sqlx::query_as::<_, UnreadModel>(
            r"
            SELECT conversation_id, user_id, count
            FROM conversation_unread
            WHERE conversation_id = ANY($1)
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        assemble_conversations(models, message_refs, unread)
    }

    async fn hydrate_one(&self, model: ConversationModel) -> RepoResult<Conversation> {
        let id = Snowflake::new(model.id);
        self.hydrate(vec![model])
            .await?
            .pop()
            .ok_or(DomainError::ConversationNotFound(id))
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r"
            SELECT id, participant_low, participant_high, created_at, updated_at
            FROM conversations
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        match result {
            Some(model) => self.hydrate_one(model).await.map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_pair(&self, pair: &ParticipantPair) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r"
            SELECT id, participant_low, participant_high, created_at, updated_at
            FROM conversations
            WHERE participant_low = $1 AND participant_high = $2
            ",
        )
        .bind(pair.low().into_inner())
        .bind(pair.high().into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        match result {
            Some(model) => self.hydrate_one(model).await.map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn get_or_create(
        &self,
        pair: &ParticipantPair,
        new_id: Snowflake,
    ) -> RepoResult<Conversation> {
        // A concurrent creator makes this a no-op; the SELECT then sees its row
        sqlx::query(
            r"
            INSERT INTO conversations (id, participant_low, participant_high, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (participant_low, participant_high) DO NOTHING
            ",
        )
        .bind(new_id.into_inner())
        .bind(pair.low().into_inner())
        .bind(pair.high().into_inner())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.find_by_pair(pair)
            .await?
            .ok_or(DomainError::ConversationNotFound(new_id))
    }

    #[instrument(skip(self))]
    async fn find_by_participant(&self, user_id: Snowflake) -> RepoResult<Vec<Conversation>> {
        let models = sqlx::query_as::<_, ConversationModel>(
            r"
            SELECT id, participant_low, participant_high, created_at, updated_at
            FROM conversations
            WHERE participant_low = $1 OR participant_high = $1
            ORDER BY updated_at DESC, id DESC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.hydrate(models).await
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, sender_id = %message.sender_id))]
    async fn append_message(
        &self,
        message: &Message,
        new_conversation_id: Snowflake,
    ) -> RepoResult<(Message, Conversation)> {
        let pair = ParticipantPair::new(message.sender_id, message.receiver_id)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO conversations (id, participant_low, participant_high, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (participant_low, participant_high) DO NOTHING
            ",
        )
        .bind(new_conversation_id.into_inner())
        .bind(pair.low().into_inner())
        .bind(pair.high().into_inner())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // Row lock orders concurrent sends within one conversation
        let conversation_id = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM conversations
            WHERE participant_low = $1 AND participant_high = $2
            FOR UPDATE
            ",
        )
        .bind(pair.low().into_inner())
        .bind(pair.high().into_inner())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;
        let conversation_id = Snowflake::new(conversation_id);

        let insert = MessageInsert::new(message, conversation_id);
        let stored = sqlx::query_as::<_, MessageModel>(
            r"
            INSERT INTO messages (id, conversation_id, sender_id, receiver_id, content, kind, created_at)
            VALUES ($1, $2, $3, $4, $5, $6::message_kind, $7)
            RETURNING id, conversation_id, sender_id, receiver_id, content, kind::TEXT AS kind, created_at
            ",
        )
        .bind(insert.id)
        .bind(insert.conversation_id)
        .bind(insert.sender_id)
        .bind(insert.receiver_id)
        .bind(insert.content)
        .bind(insert.kind)
        .bind(message.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO conversation_unread (conversation_id, user_id, count)
            VALUES ($1, $2, 1)
            ON CONFLICT (conversation_id, user_id)
            DO UPDATE SET count = conversation_unread.count + 1
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(message.receiver_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query("UPDATE conversations SET updated_at = $2 WHERE id = $1")
            .bind(conversation_id.into_inner())
            .bind(message.created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        let stored = Message::try_from(stored)?;
        let conversation = self
            .find_by_id(conversation_id)
            .await?
            .ok_or(DomainError::ConversationNotFound(conversation_id))?;

        Ok((stored, conversation))
    }

    #[instrument(skip(self))]
    async fn read_thread(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Vec<Message>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Same row lock append_message takes, so no send lands between the
        // history read and the reset
        sqlx::query_scalar::<_, i64>("SELECT id FROM conversations WHERE id = $1 FOR UPDATE")
            .bind(conversation_id.into_inner())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_error)?
            .ok_or(DomainError::ConversationNotFound(conversation_id))?;

        let results = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, conversation_id, sender_id, receiver_id, content, kind::TEXT AS kind, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(conversation_id.into_inner())
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO conversation_unread (conversation_id, user_id, count)
            VALUES ($1, $2, 0)
            ON CONFLICT (conversation_id, user_id)
            DO UPDATE SET count = 0
            ",
        )
        .bind(conversation_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        results.into_iter().map(Message::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn messages(&self, conversation_id: Snowflake) -> RepoResult<Vec<Message>> {
        let results = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, conversation_id, sender_id, receiver_id, content, kind::TEXT AS kind, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(conversation_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Message::try_from).collect()
    }
}
