//! Messaging service
//!
//! Direct conversations between two users with per-participant unread
//! counters. A send stores the message and bumps the receiver's counter in
//! one repository write, then pushes `MESSAGE_CREATED` to the receiver.

use stay_core::entities::{Message, MessageKind, ParticipantPair};
use stay_core::{DomainEvent, Snowflake};
use tracing::{info, instrument};

use crate::dto::{
    ConversationResponse, ConversationSummaryResponse, MessageResponse, SendMessageRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Messaging service
pub struct MessagingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessagingService<'a> {
    /// Create a new MessagingService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// The conversation between two users, created empty if absent
    #[instrument(skip(self))]
    pub async fn get_or_create_conversation(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
    ) -> ServiceResult<ConversationResponse> {
        let pair = ParticipantPair::new(user_a, user_b)?;
        let conversation = self
            .ctx
            .conversation_repo()
            .get_or_create(&pair, self.ctx.generate_id())
            .await?;
        Ok(ConversationResponse::from(&conversation))
    }

    #[instrument(skip(self, request), fields(receiver_id = %request.receiver_id, kind = %request.kind.as_str()))]
    pub async fn send_message(
        &self,
        sender_id: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        ParticipantPair::new(sender_id, request.receiver_id)?;
        Message::validate_content(&request.content)?;

        let message = Message::new(
            self.ctx.generate_id(),
            Snowflake::default(),
            sender_id,
            request.receiver_id,
            request.content,
            request.kind,
        );
        let (stored, conversation) = self
            .ctx
            .conversation_repo()
            .append_message(&message, self.ctx.generate_id())
            .await?;

        info!(
            message_id = %stored.id,
            conversation_id = %conversation.id,
            unread = conversation.unread_for(stored.receiver_id),
            "Message sent"
        );

        let reached = self
            .ctx
            .publish(stored.receiver_id, &DomainEvent::message_created(&stored));
        if reached == 0 {
            self.ctx
                .notify(stored.receiver_id, "New message", &stored.preview(80))
                .await;
        }

        Ok(MessageResponse::from(stored))
    }

    /// Upload a blob and send its URL as a media message
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn send_media_message(
        &self,
        sender_id: Snowflake,
        receiver_id: Snowflake,
        bytes: &[u8],
        content_type: &str,
        kind: MessageKind,
    ) -> ServiceResult<MessageResponse> {
        if !kind.is_media() {
            return Err(ServiceError::validation("media messages need a media kind"));
        }
        if bytes.is_empty() {
            return Err(ServiceError::validation("media upload is empty"));
        }
        // Reject self-messages before anything is stored
        ParticipantPair::new(sender_id, receiver_id)?;

        let url = self.ctx.media_storage().upload(bytes, content_type).await?;
        self.send_message(
            sender_id,
            SendMessageRequest {
                receiver_id,
                content: url,
                kind,
            },
        )
        .await
    }

    /// History with `other_id`, oldest first. Resets only the requester's
    /// unread counter; no conversation means no messages and no write.
    #[instrument(skip(self))]
    pub async fn get_messages(
        &self,
        requester_id: Snowflake,
        other_id: Snowflake,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let pair = ParticipantPair::new(requester_id, other_id)?;
        let Some(conversation) = self.ctx.conversation_repo().find_by_pair(&pair).await? else {
            return Ok(Vec::new());
        };

        let messages = self
            .ctx
            .conversation_repo()
            .read_thread(conversation.id, requester_id)
            .await?;

        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }

    /// Inbox rows for a user, most recently active first
    #[instrument(skip(self))]
    pub async fn list_conversations_for(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<ConversationSummaryResponse>> {
        let conversations = self.ctx.conversation_repo().find_by_participant(user_id).await?;

        conversations
            .into_iter()
            .map(|c| {
                let other = c.participants.other(user_id).ok_or_else(|| {
                    ServiceError::internal(format!("user {user_id} not in conversation {}", c.id))
                })?;
                Ok(ConversationSummaryResponse {
                    conversation_id: c.id,
                    other_participant_id: other,
                    unread_count: c.unread_for(user_id),
                    last_message_id: c.last_message_id(),
                    updated_at: c.updated_at,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHarness;

    fn text(to: Snowflake, content: &str) -> SendMessageRequest {
        SendMessageRequest {
            receiver_id: to,
            content: content.to_string(),
            kind: MessageKind::Text,
        }
    }

    #[tokio::test]
    async fn test_unread_counts_follow_sends_and_reads() {
        let harness = TestHarness::new();
        let service = MessagingService::new(&harness.ctx);
        let (alice, bob) = (harness.ctx.generate_id(), harness.ctx.generate_id());

        service.send_message(alice, text(bob, "hi")).await.unwrap();
        service.send_message(alice, text(bob, "room free?")).await.unwrap();

        let bob_inbox = service.list_conversations_for(bob).await.unwrap();
        assert_eq!(bob_inbox.len(), 1);
        assert_eq!(bob_inbox[0].other_participant_id, alice);
        assert_eq!(bob_inbox[0].unread_count, 2);
        let alice_inbox = service.list_conversations_for(alice).await.unwrap();
        assert_eq!(alice_inbox[0].unread_count, 0);

        let history = service.get_messages(bob, alice).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "hi");
        assert_eq!(history[1].content, "room free?");
        assert_eq!(bob_inbox[0].last_message_id, Some(history[1].id));

        let bob_inbox = service.list_conversations_for(bob).await.unwrap();
        assert_eq!(bob_inbox[0].unread_count, 0);
    }

    #[tokio::test]
    async fn test_concurrent_sends_each_count_once() {
        let harness = TestHarness::new();
        let service = MessagingService::new(&harness.ctx);
        let (alice, bob) = (harness.ctx.generate_id(), harness.ctx.generate_id());

        let sends = (0..25).map(|i| service.send_message(alice, text(bob, &format!("msg {i}"))));
        let sent = futures::future::join_all(sends).await;
        assert!(sent.iter().all(Result::is_ok));

        let bob_inbox = service.list_conversations_for(bob).await.unwrap();
        assert_eq!(bob_inbox.len(), 1);
        assert_eq!(bob_inbox[0].unread_count, 25);
        let conversation = service.get_or_create_conversation(bob, alice).await.unwrap();
        assert_eq!(conversation.message_count, 25);
    }

    #[tokio::test]
    async fn test_reads_interleaved_with_sends_lose_nothing() {
        let harness = TestHarness::new();
        let service = MessagingService::new(&harness.ctx);
        let (alice, bob) = (harness.ctx.generate_id(), harness.ctx.generate_id());
        service.send_message(alice, text(bob, "first")).await.unwrap();

        let writer = async {
            for i in 0..50 {
                service.send_message(alice, text(bob, &format!("msg {i}"))).await.unwrap();
                tokio::task::yield_now().await;
            }
        };
        let reader = async {
            let mut seen = 0;
            for _ in 0..50 {
                seen = service.get_messages(bob, alice).await.unwrap().len();
                tokio::task::yield_now().await;
            }
            seen
        };
        let ((), seen) = tokio::join!(writer, reader);

        // Everything bob has not yet fetched is still counted as unread
        let unread = service.list_conversations_for(bob).await.unwrap()[0].unread_count;
        assert_eq!(seen + usize::try_from(unread).unwrap(), 51);
    }

    #[tokio::test]
    async fn test_reading_does_not_touch_other_counter() {
        let harness = TestHarness::new();
        let service = MessagingService::new(&harness.ctx);
        let (alice, bob) = (harness.ctx.generate_id(), harness.ctx.generate_id());

        service.send_message(alice, text(bob, "ping")).await.unwrap();
        service.get_messages(alice, bob).await.unwrap();

        let bob_inbox = service.list_conversations_for(bob).await.unwrap();
        assert_eq!(bob_inbox[0].unread_count, 1);
    }

    #[tokio::test]
    async fn test_event_goes_to_receiver_only() {
        let harness = TestHarness::new();
        let service = MessagingService::new(&harness.ctx);
        let (alice, bob) = (harness.ctx.generate_id(), harness.ctx.generate_id());

        let sent = service.send_message(alice, text(bob, "hello")).await.unwrap();

        let events = harness.events.events_for(bob);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], DomainEvent::MessageCreated(e) if e.message_id == sent.id));
        assert!(harness.events.events_for(alice).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_sends() {
        let harness = TestHarness::new();
        let service = MessagingService::new(&harness.ctx);
        let alice = harness.ctx.generate_id();
        let bob = harness.ctx.generate_id();

        assert!(service.send_message(alice, text(alice, "me")).await.unwrap_err().is_validation());
        assert!(service.send_message(alice, text(bob, "   ")).await.unwrap_err().is_validation());
        let long = "a".repeat(4001);
        assert!(service.send_message(alice, text(bob, &long)).await.unwrap_err().is_validation());
        assert!(service.list_conversations_for(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_without_conversation_is_empty() {
        let harness = TestHarness::new();
        let service = MessagingService::new(&harness.ctx);
        let (alice, bob) = (harness.ctx.generate_id(), harness.ctx.generate_id());

        assert!(service.get_messages(alice, bob).await.unwrap().is_empty());
        assert!(service.list_conversations_for(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_or_create_is_order_independent() {
        let harness = TestHarness::new();
        let service = MessagingService::new(&harness.ctx);
        let (alice, bob) = (harness.ctx.generate_id(), harness.ctx.generate_id());

        let a = service.get_or_create_conversation(alice, bob).await.unwrap();
        let b = service.get_or_create_conversation(bob, alice).await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.message_count, 0);

        let err = service.get_or_create_conversation(alice, alice).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_media_message_sends_uploaded_url() {
        let harness = TestHarness::new();
        let service = MessagingService::new(&harness.ctx);
        let (alice, bob) = (harness.ctx.generate_id(), harness.ctx.generate_id());

        let sent = service
            .send_media_message(alice, bob, b"\x89PNG", "image/png", MessageKind::Image)
            .await
            .unwrap();
        assert_eq!(sent.kind, MessageKind::Image);
        assert!(sent.content.starts_with("memory://"));
        assert_eq!(harness.media.uploads(), 1);

        let err = service
            .send_media_message(alice, bob, b"data", "text/plain", MessageKind::Text)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(harness.media.uploads(), 1);
    }

    #[tokio::test]
    async fn test_offline_receiver_gets_notification() {
        let harness = TestHarness::new();
        harness.events.set_live_connections(0);
        let service = MessagingService::new(&harness.ctx);
        let (alice, bob) = (harness.ctx.generate_id(), harness.ctx.generate_id());

        service.send_message(alice, text(bob, "are you there")).await.unwrap();
        assert_eq!(harness.notifier.sent_to(bob).len(), 1);
    }
}
